pub mod class;
pub mod student;
pub mod subject;
pub mod teacher;

use db::models::user::Department;

/// Branches that get classes and subjects.
pub const BRANCHES: [Department; 3] = [Department::Cse, Department::Ece, Department::Me];
