use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "subjects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Course code, e.g. `CS102`.
    pub code: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::class_subject::Entity")]
    ClassSubjects,
    #[sea_orm(has_many = "super::teacher_class::Entity")]
    TeacherClasses,
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
    pub async fn create(db: &DbConn, code: &str, name: &str) -> Result<Model, DbErr> {
        ActiveModel {
            code: Set(code.to_owned()),
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id(db: &DbConn, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Subjects are matched by display name when a teacher starts a session.
    pub async fn find_by_name(db: &DbConn, name: &str) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::Name.eq(name.trim()))
            .all(db)
            .await
    }

    pub async fn find_by_ids(db: &DbConn, ids: Vec<i64>) -> Result<Vec<Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Entity::find().filter(Column::Id.is_in(ids)).all(db).await
    }
}
