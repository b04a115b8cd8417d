pub mod attendance_record;
pub mod class;
pub mod class_subject;
pub mod notification;
pub mod student;
pub mod subject;
pub mod teacher;
pub mod teacher_class;
pub mod user;

pub use attendance_record::Entity as AttendanceRecord;
pub use class::Entity as Class;
pub use class_subject::Entity as ClassSubject;
pub use notification::Entity as Notification;
pub use student::Entity as Student;
pub use subject::Entity as Subject;
pub use teacher::Entity as Teacher;
pub use teacher_class::Entity as TeacherClass;
pub use user::Entity as User;
