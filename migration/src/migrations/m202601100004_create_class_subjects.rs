use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601100004_create_class_subjects"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("class_subjects"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("class_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("subject_id")).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(Alias::new("class_id"))
                            .col(Alias::new("subject_id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_subjects_class")
                            .from(Alias::new("class_subjects"), Alias::new("class_id"))
                            .to(Alias::new("classes"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_subjects_subject")
                            .from(Alias::new("class_subjects"), Alias::new("subject_id"))
                            .to(Alias::new("subjects"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("class_subjects")).to_owned())
            .await
    }
}
