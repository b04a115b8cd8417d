use crate::seed::Seeder;
use db::models::subject::Model;
use sea_orm::{DatabaseConnection, DbErr};

pub struct SubjectSeeder;

/// `(code, name)`; the code prefix picks the branch that takes the subject.
pub const SUBJECTS: [(&str, &str); 12] = [
    ("CS301", "Operating Systems"),
    ("CS302", "Database Management Systems"),
    ("CS303", "Computer Networks"),
    ("CS501", "Compiler Design"),
    ("CS502", "Machine Learning"),
    ("EC301", "Signals and Systems"),
    ("EC302", "Digital Electronics"),
    ("EC501", "VLSI Design"),
    ("EC502", "Communication Systems"),
    ("ME301", "Thermodynamics"),
    ("ME302", "Fluid Mechanics"),
    ("ME501", "Heat Transfer"),
];

#[async_trait::async_trait]
impl Seeder for SubjectSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        for (code, name) in SUBJECTS {
            Model::create(db, code, name).await?;
        }
        Ok(())
    }
}
