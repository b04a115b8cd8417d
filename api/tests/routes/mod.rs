mod attendance_test;
mod auth;
mod health_test;
mod me_test;
mod student_test;
mod teacher_test;
