//! Create `hwm` table with FK to `namespace`.
//!
//! Rows are soft-deleted so their history stays addressable; live names are
//! unique per namespace through a partial index added in the index migration.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hwm::Table)
                    .if_not_exists()
                    .col(uuid(Hwm::Id).primary_key())
                    .col(uuid(Hwm::NamespaceId).not_null())
                    .col(string_len(Hwm::Name, 2048).not_null())
                    .col(text(Hwm::Description).not_null().default(""))
                    .col(string_len(Hwm::Type, 64).not_null())
                    .col(json_binary(Hwm::Value).not_null())
                    .col(ColumnDef::new(Hwm::Entity).text().null())
                    .col(ColumnDef::new(Hwm::Expression).text().null())
                    .col(boolean(Hwm::IsDeleted).not_null().default(false))
                    .col(timestamp_with_time_zone(Hwm::ChangedAt).not_null())
                    .col(ColumnDef::new(Hwm::ChangedByUserId).uuid().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hwm_namespace_id")
                            .from(Hwm::Table, Hwm::NamespaceId)
                            .to(Namespace::Table, Namespace::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hwm_changed_by_user_id")
                            .from(Hwm::Table, Hwm::ChangedByUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Hwm::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Hwm {
    Table,
    Id,
    NamespaceId,
    Name,
    Description,
    Type,
    Value,
    Entity,
    Expression,
    IsDeleted,
    ChangedAt,
    ChangedByUserId,
}

#[derive(DeriveIden)]
enum Namespace { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
