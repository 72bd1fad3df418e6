use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Namespace: owner lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_namespace_owner_id")
                    .table(Namespace::Table)
                    .col(Namespace::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Hwm: listing by namespace
        manager
            .create_index(
                Index::create()
                    .name("idx_hwm_namespace_id")
                    .table(Hwm::Table)
                    .col(Hwm::NamespaceId)
                    .to_owned(),
            )
            .await?;

        // Hwm: live names are unique within a namespace
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uniq_hwm_namespace_id_name \
                 ON hwm (namespace_id, name) WHERE NOT is_deleted",
            )
            .await?;

        // HwmHistory: history of one HWM, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_hwm_history_hwm_id_changed_at")
                    .table(HwmHistory::Table)
                    .col(HwmHistory::HwmId)
                    .col(HwmHistory::ChangedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_namespace_owner_id").table(Namespace::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_hwm_namespace_id").table(Hwm::Table).to_owned())
            .await?;
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS uniq_hwm_namespace_id_name")
            .await?;
        manager
            .drop_index(Index::drop().name("idx_hwm_history_hwm_id_changed_at").table(HwmHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Namespace { Table, OwnerId }

#[derive(DeriveIden)]
enum Hwm { Table, NamespaceId }

#[derive(DeriveIden)]
enum HwmHistory { Table, HwmId, ChangedAt }
