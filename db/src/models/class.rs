use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DbErr, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use super::user::Department;

/// A cohort of students sharing a branch and semester (e.g. `CSE-2`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub code: String,
    pub branch: Department,
    pub semester: Semester,
}

/// Semesters in roman numerals. Declaration order is the academic order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Semester {
    #[sea_orm(string_value = "I")]
    I,
    #[sea_orm(string_value = "II")]
    II,
    #[sea_orm(string_value = "III")]
    III,
    #[sea_orm(string_value = "IV")]
    IV,
    #[sea_orm(string_value = "V")]
    V,
    #[sea_orm(string_value = "VI")]
    VI,
    #[sea_orm(string_value = "VII")]
    VII,
    #[sea_orm(string_value = "VIII")]
    VIII,
}

impl Semester {
    pub const ALL: [Semester; 8] = [
        Semester::I,
        Semester::II,
        Semester::III,
        Semester::IV,
        Semester::V,
        Semester::VI,
        Semester::VII,
        Semester::VIII,
    ];

    /// `1..=8` to `I..=VIII`.
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::student::Entity")]
    Students,
    #[sea_orm(has_many = "super::class_subject::Entity")]
    ClassSubjects,
    #[sea_orm(has_many = "super::teacher_class::Entity")]
    TeacherClasses,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl Related<super::class_subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSubjects.def()
    }
}

impl Related<super::teacher_class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeacherClasses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        code: &str,
        branch: Department,
        semester: Semester,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            code: Set(code.to_owned()),
            branch: Set(branch),
            semester: Set(semester),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id(db: &DbConn, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    pub async fn find_by_ids(db: &DbConn, ids: Vec<i64>) -> Result<Vec<Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Entity::find().filter(Column::Id.is_in(ids)).all(db).await
    }

    pub async fn find_by_branch_semester(
        db: &DbConn,
        branch: Department,
        semester: Semester,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::Branch.eq(branch))
            .filter(Column::Semester.eq(semester))
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn semester_parsing_and_order() {
        assert_eq!(Semester::from_number(1), Some(Semester::I));
        assert_eq!(Semester::from_number(8), Some(Semester::VIII));
        assert_eq!(Semester::from_number(0), None);
        assert_eq!(Semester::from_number(9), None);
        assert_eq!(Semester::from_str("iv").unwrap(), Semester::IV);
        assert!(Semester::II < Semester::VII);
        assert_eq!(Semester::VI.to_string(), "VI");
    }
}
