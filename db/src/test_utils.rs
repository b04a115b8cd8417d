use migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::models::{
    class::{self, Semester},
    class_subject, student, subject, teacher, teacher_class,
    user::{self, Department, Gender, Role},
};

/// Fresh in-memory SQLite database with every migration applied.
///
/// The pool is pinned to a single connection: each new in-memory connection
/// would otherwise open its own empty database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// A teacher assigned to teach one subject to one class of students.
pub struct Classroom {
    pub teacher: user::Model,
    pub class: class::Model,
    pub subject: subject::Model,
    /// Ordered by registration number. Every student except the last has a device token.
    pub students: Vec<user::Model>,
}

/// Seeds `CSE` semester `III` taking `Operating Systems` with `student_count` students.
pub async fn seed_classroom(db: &DatabaseConnection, student_count: usize) -> Classroom {
    let teacher = user::Model::create(db, "Prof. Rao", "rao@test.com", Role::Teacher, Gender::Male, Department::Cse)
        .await
        .expect("teacher user");
    teacher::Model::create(db, teacher.id, "T001")
        .await
        .expect("teacher profile");

    let class = class::Model::create(db, "CSE-III", Department::Cse, Semester::III)
        .await
        .expect("class");
    let subject = subject::Model::create(db, "CS301", "Operating Systems")
        .await
        .expect("subject");
    class_subject::Model::link(db, class.id, subject.id)
        .await
        .expect("class subject");
    teacher_class::Model::assign(db, teacher.id, class.id, subject.id)
        .await
        .expect("assignment");

    let mut students = Vec::with_capacity(student_count);
    for i in 1..=student_count {
        let u = user::Model::create(
            db,
            &format!("Student {i}"),
            &format!("s{i}@test.com"),
            Role::Student,
            if i % 2 == 0 { Gender::Female } else { Gender::Male },
            Department::Cse,
        )
        .await
        .expect("student user");
        student::Model::create(db, u.id, class.id, &format!("1RV23CS{i:03}"), 2)
            .await
            .expect("student profile");

        let u = if i < student_count {
            user::Model::set_fcm_token(db, u.id, Some(&format!("device-{i}")))
                .await
                .expect("device token")
        } else {
            u
        };
        students.push(u);
    }

    Classroom {
        teacher,
        class,
        subject,
        students,
    }
}
