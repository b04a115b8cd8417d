use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202601100001_create_users::Migration),
            Box::new(migrations::m202601100002_create_classes::Migration),
            Box::new(migrations::m202601100003_create_subjects::Migration),
            Box::new(migrations::m202601100004_create_class_subjects::Migration),
            Box::new(migrations::m202601100005_create_teachers::Migration),
            Box::new(migrations::m202601100006_create_students::Migration),
            Box::new(migrations::m202601100007_create_teacher_classes::Migration),
            Box::new(migrations::m202601100008_create_attendance_records::Migration),
            Box::new(migrations::m202601100009_create_notifications::Migration),
        ]
    }
}
