use crate::seed::{Seeder, run_seeder};
use crate::seeds::{
    class::ClassSeeder, student::StudentSeeder, subject::SubjectSeeder, teacher::TeacherSeeder,
};
use migration::Migrator;
use sea_orm_migration::MigratorTrait;

mod seed;
mod seeds;

#[tokio::main]
async fn main() {
    let db = match db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(&db, None).await {
        eprintln!("Failed to apply migrations: {e}");
        std::process::exit(1);
    }

    for (seeder, name) in [
        (Box::new(SubjectSeeder) as Box<dyn Seeder + Send + Sync>, "Subject"),
        (Box::new(ClassSeeder), "Class"),
        (Box::new(TeacherSeeder), "Teacher"),
        (Box::new(StudentSeeder), "Student"),
    ] {
        run_seeder(&*seeder, name, &db).await;
    }
}
