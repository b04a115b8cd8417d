use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601100008_create_attendance_records"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("attendance_records"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("class_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("subject_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("teacher_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("teacher_latitude")).double().not_null())
                    .col(ColumnDef::new(Alias::new("teacher_longitude")).double().not_null())
                    .col(ColumnDef::new(Alias::new("date")).timestamp().not_null())
                    .col(ColumnDef::new(Alias::new("session_start")).timestamp().not_null())
                    .col(ColumnDef::new(Alias::new("session_end")).timestamp().not_null())
                    // `{ "<student_id>": { "status": "present" | "absent" } }`
                    .col(ColumnDef::new(Alias::new("student_records")).json().not_null())
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Alias::new("updated_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_att_rec_class")
                            .from(Alias::new("attendance_records"), Alias::new("class_id"))
                            .to(Alias::new("classes"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_att_rec_subject")
                            .from(Alias::new("attendance_records"), Alias::new("subject_id"))
                            .to(Alias::new("subjects"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_att_rec_teacher")
                            .from(Alias::new("attendance_records"), Alias::new("teacher_id"))
                            .to(Alias::new("teachers"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_att_rec_class_end")
                    .table(Alias::new("attendance_records"))
                    .col(Alias::new("class_id"))
                    .col(Alias::new("session_end"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("attendance_records")).to_owned())
            .await
    }
}
