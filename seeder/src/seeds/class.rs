use crate::seed::Seeder;
use crate::seeds::BRANCHES;
use db::models::{
    class::{self, Semester},
    class_subject, subject,
    user::Department,
};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

pub struct ClassSeeder;

pub const SEMESTERS: [Semester; 2] = [Semester::III, Semester::V];

/// Subject code prefix used by a branch, e.g. `CS` for CSE.
pub fn code_prefix(branch: Department) -> &'static str {
    match branch {
        Department::Cse => "CS",
        Department::Ece => "EC",
        Department::Me => "ME",
        Department::Eee => "EE",
        Department::Ce => "CV",
        Department::It => "IT",
    }
}

/// Subject codes carry the semester as their first digit (`CS301` is semester III).
fn taught_in(code: &str, branch: Department, semester: Semester) -> bool {
    let digit = match semester {
        Semester::III => '3',
        Semester::V => '5',
        _ => return false,
    };
    let prefix = code_prefix(branch);
    code.starts_with(prefix) && code[prefix.len()..].starts_with(digit)
}

#[async_trait::async_trait]
impl Seeder for ClassSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let subjects = subject::Entity::find().all(db).await?;

        for branch in BRANCHES {
            for semester in SEMESTERS {
                let class = class::Model::create(db, &format!("{branch}-{semester}"), branch, semester).await?;
                for s in subjects.iter().filter(|s| taught_in(&s.code, branch, semester)) {
                    class_subject::Model::link(db, class.id, s.id).await?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_codes_map_to_branch_and_semester() {
        assert!(taught_in("CS301", Department::Cse, Semester::III));
        assert!(!taught_in("CS301", Department::Cse, Semester::V));
        assert!(!taught_in("EC301", Department::Cse, Semester::III));
        assert!(taught_in("ME501", Department::Me, Semester::V));
    }
}
