use crate::seed::Seeder;
use crate::seeds::{class::code_prefix, teacher::random_gender};
use db::models::{
    class::{self, Semester},
    student,
    user::{self, Department, Role},
};
use std::collections::HashMap;
use fake::{Fake, faker::name::en::Name};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

pub struct StudentSeeder;

const STUDENTS_PER_CLASS: usize = 12;

fn year_of(semester: Semester) -> i32 {
    (Semester::ALL.iter().position(|s| *s == semester).unwrap_or(0) as i32) / 2 + 1
}

#[async_trait::async_trait]
impl Seeder for StudentSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let classes = class::Entity::find().all(db).await?;
        let mut first = true;
        let mut serials: HashMap<Department, usize> = HashMap::new();

        for c in classes {
            let year = year_of(c.semester);
            // admission batch, e.g. 23 for second-years in 2024-25
            let batch = 25 - year;
            for _ in 0..STUDENTS_PER_CLASS {
                let serial = serials.entry(c.branch).or_default();
                *serial += 1;
                let reg_no = format!("1RV{batch}{}{serial:03}", code_prefix(c.branch));
                let (name, email) = if first {
                    first = false;
                    ("Demo Student".to_string(), "student@attendx.local".to_string())
                } else {
                    (Name().fake(), format!("{}@attendx.local", reg_no.to_lowercase()))
                };

                let u = user::Model::create(db, &name, &email, Role::Student, random_gender(), c.branch).await?;
                student::Model::create(db, u.id, c.id, &reg_no, year).await?;
            }
        }
        Ok(())
    }
}
