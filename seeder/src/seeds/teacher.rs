use crate::seed::Seeder;
use crate::seeds::BRANCHES;
use db::models::{
    class, class_subject, teacher, teacher_class,
    user::{self, Department, Gender, Role},
};
use fake::{Fake, faker::name::en::Name};
use rand::Rng;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

pub struct TeacherSeeder;

const TEACHERS_PER_BRANCH: usize = 2;

#[async_trait::async_trait]
impl Seeder for TeacherSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let mut staff_no = 0;

        for branch in BRANCHES {
            let mut staff: Vec<i64> = Vec::with_capacity(TEACHERS_PER_BRANCH);
            for _ in 0..TEACHERS_PER_BRANCH {
                staff_no += 1;
                let (name, email) = if staff_no == 1 {
                    ("Demo Teacher".to_string(), "teacher@attendx.local".to_string())
                } else {
                    (Name().fake(), format!("teacher{staff_no}@attendx.local"))
                };
                let gender = random_gender();
                let u = user::Model::create(db, &name, &email, Role::Teacher, gender, branch).await?;
                teacher::Model::create(db, u.id, &format!("T{staff_no:03}")).await?;
                staff.push(u.id);
            }

            assign_round_robin(db, branch, &staff).await?;
        }
        Ok(())
    }
}

/// Every subject of every class in `branch` gets one of `staff`, in turn.
async fn assign_round_robin(db: &DatabaseConnection, branch: Department, staff: &[i64]) -> Result<(), DbErr> {
    let classes = class::Entity::find()
        .filter(class::Column::Branch.eq(branch))
        .all(db)
        .await?;

    let mut next = 0;
    for c in classes {
        let links = class_subject::Entity::find()
            .filter(class_subject::Column::ClassId.eq(c.id))
            .all(db)
            .await?;
        for link in links {
            teacher_class::Model::assign(db, staff[next % staff.len()], c.id, link.subject_id).await?;
            next += 1;
        }
    }
    Ok(())
}

pub fn random_gender() -> Gender {
    match rand::rng().random_range(0..10) {
        0..=4 => Gender::Male,
        5..=8 => Gender::Female,
        _ => Gender::Other,
    }
}
