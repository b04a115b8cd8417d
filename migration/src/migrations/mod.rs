pub mod m202601100001_create_users;
pub mod m202601100002_create_classes;
pub mod m202601100003_create_subjects;
pub mod m202601100004_create_class_subjects;
pub mod m202601100005_create_teachers;
pub mod m202601100006_create_students;
pub mod m202601100007_create_teacher_classes;
pub mod m202601100008_create_attendance_records;
pub mod m202601100009_create_notifications;
