use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601100005_create_teachers"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("teachers"))
                    .if_not_exists()
                    // Shares its primary key with `users.id`
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(Alias::new("teacher_id_no")).string().not_null().unique_key())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teachers_user")
                            .from(Alias::new("teachers"), Alias::new("id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("teachers")).to_owned())
            .await
    }
}
