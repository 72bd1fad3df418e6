//! Create `namespace` table.
//!
//! A namespace groups HWMs and is owned by the user who created it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Namespace::Table)
                    .if_not_exists()
                    .col(uuid(Namespace::Id).primary_key())
                    .col(string_len(Namespace::Name, 256).unique_key().not_null())
                    .col(text(Namespace::Description).not_null().default(""))
                    .col(uuid(Namespace::OwnerId).not_null())
                    .col(timestamp_with_time_zone(Namespace::ChangedAt).not_null())
                    .col(ColumnDef::new(Namespace::ChangedByUserId).uuid().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_namespace_owner_id")
                            .from(Namespace::Table, Namespace::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_namespace_changed_by_user_id")
                            .from(Namespace::Table, Namespace::ChangedByUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Namespace::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Namespace { Table, Id, Name, Description, OwnerId, ChangedAt, ChangedByUserId }

#[derive(DeriveIden)]
enum User { Table, Id }
