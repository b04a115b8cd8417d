use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601100007_create_teacher_classes"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("teacher_classes"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("teacher_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("class_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("subject_id")).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teacher_classes_teacher")
                            .from(Alias::new("teacher_classes"), Alias::new("teacher_id"))
                            .to(Alias::new("teachers"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teacher_classes_class")
                            .from(Alias::new("teacher_classes"), Alias::new("class_id"))
                            .to(Alias::new("classes"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teacher_classes_subject")
                            .from(Alias::new("teacher_classes"), Alias::new("subject_id"))
                            .to(Alias::new("subjects"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teacher_classes_unique")
                    .table(Alias::new("teacher_classes"))
                    .col(Alias::new("teacher_id"))
                    .col(Alias::new("class_id"))
                    .col(Alias::new("subject_id"))
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("teacher_classes")).to_owned())
            .await
    }
}
