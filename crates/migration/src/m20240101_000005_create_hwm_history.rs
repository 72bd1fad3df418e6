//! Create `hwm_history` table.
//!
//! Append-only snapshot of an HWM written on every create, update and delete.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HwmHistory::Table)
                    .if_not_exists()
                    .col(uuid(HwmHistory::Id).primary_key())
                    .col(uuid(HwmHistory::HwmId).not_null())
                    .col(uuid(HwmHistory::NamespaceId).not_null())
                    .col(string_len(HwmHistory::Name, 2048).not_null())
                    .col(text(HwmHistory::Description).not_null().default(""))
                    .col(string_len(HwmHistory::Type, 64).not_null())
                    .col(json_binary(HwmHistory::Value).not_null())
                    .col(ColumnDef::new(HwmHistory::Entity).text().null())
                    .col(ColumnDef::new(HwmHistory::Expression).text().null())
                    .col(string_len(HwmHistory::Action, 32).not_null())
                    .col(timestamp_with_time_zone(HwmHistory::ChangedAt).not_null())
                    .col(ColumnDef::new(HwmHistory::ChangedByUserId).uuid().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hwm_history_hwm_id")
                            .from(HwmHistory::Table, HwmHistory::HwmId)
                            .to(Hwm::Table, Hwm::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hwm_history_namespace_id")
                            .from(HwmHistory::Table, HwmHistory::NamespaceId)
                            .to(Namespace::Table, Namespace::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hwm_history_changed_by_user_id")
                            .from(HwmHistory::Table, HwmHistory::ChangedByUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(HwmHistory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum HwmHistory {
    Table,
    Id,
    HwmId,
    NamespaceId,
    Name,
    Description,
    Type,
    Value,
    Entity,
    Expression,
    Action,
    ChangedAt,
    ChangedByUserId,
}

#[derive(DeriveIden)]
enum Hwm { Table, Id }

#[derive(DeriveIden)]
enum Namespace { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
