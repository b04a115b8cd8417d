use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601100006_create_students"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("students"))
                    .if_not_exists()
                    // Shares its primary key with `users.id`
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(Alias::new("class_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("reg_no")).string().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("year")).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_user")
                            .from(Alias::new("students"), Alias::new("id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_class")
                            .from(Alias::new("students"), Alias::new("class_id"))
                            .to(Alias::new("classes"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("students")).to_owned())
            .await
    }
}
