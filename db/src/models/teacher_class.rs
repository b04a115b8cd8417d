use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DbErr, EntityTrait, QueryFilter};

/// Assignment of a teacher to teach one subject to one class.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "teacher_classes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub teacher_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teacher::Entity",
        from = "Column::TeacherId",
        to = "super::teacher::Column::Id",
        on_delete = "Cascade"
    )]
    Teacher,
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id",
        on_delete = "Cascade"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id",
        on_delete = "Cascade"
    )]
    Subject,
}

impl Related<super::teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn assign(
        db: &DbConn,
        teacher_id: i64,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            teacher_id: Set(teacher_id),
            class_id: Set(class_id),
            subject_id: Set(subject_id),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// The assignment of `teacher_id` to any of `class_ids` for any of `subject_ids`, if one exists.
    pub async fn find_assignment(
        db: &DbConn,
        teacher_id: i64,
        class_ids: Vec<i64>,
        subject_ids: Vec<i64>,
    ) -> Result<Option<Model>, DbErr> {
        if class_ids.is_empty() || subject_ids.is_empty() {
            return Ok(None);
        }
        Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::ClassId.is_in(class_ids))
            .filter(Column::SubjectId.is_in(subject_ids))
            .one(db)
            .await
    }

    pub async fn for_class(db: &DbConn, class_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ClassId.eq(class_id))
            .all(db)
            .await
    }

    pub async fn for_teacher(db: &DbConn, teacher_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .all(db)
            .await
    }
}
