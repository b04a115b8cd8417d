use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DbErr, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use super::user;

/// Student profile. Shares its primary key with `users.id`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub class_id: i64,
    /// University registration number; rosters are ordered by it.
    pub reg_no: String,
    pub year: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::Id",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id",
        on_delete = "Cascade"
    )]
    Class,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        user_id: i64,
        class_id: i64,
        reg_no: &str,
        year: i32,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(user_id),
            class_id: Set(class_id),
            reg_no: Set(reg_no.to_owned()),
            year: Set(year),
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id(db: &DbConn, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Students enrolled in a class joined with their user rows, ordered by registration number.
    pub async fn roster_for_class(
        db: &DbConn,
        class_id: i64,
    ) -> Result<Vec<(Model, user::Model)>, DbErr> {
        let rows = Entity::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_asc(Column::RegNo)
            .find_also_related(user::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(student, user)| user.map(|u| (student, u)))
            .collect())
    }

    /// Students (with user rows) for an arbitrary id set, ordered by registration number.
    pub async fn with_users(
        db: &DbConn,
        ids: Vec<i64>,
    ) -> Result<Vec<(Model, user::Model)>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = Entity::find()
            .filter(Column::Id.is_in(ids))
            .order_by_asc(Column::RegNo)
            .find_also_related(user::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(student, user)| user.map(|u| (student, u)))
            .collect())
    }
}
