use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Events::TenantId).string().not_null())
                    .col(ColumnDef::new(Events::ExternalId).string())
                    .col(ColumnDef::new(Events::EventType).string().not_null())
                    .col(ColumnDef::new(Events::Severity).string().not_null())
                    .col(ColumnDef::new(Events::Title).string().not_null())
                    .col(ColumnDef::new(Events::Message).text())
                    .col(ColumnDef::new(Events::OccurredAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Events::ReceivedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Events::SourceService).string().not_null())
                    .col(ColumnDef::new(Events::SourceEndpoint).string())
                    .col(ColumnDef::new(Events::SourceMethod).string())
                    .col(ColumnDef::new(Events::SourceVersion).string())
                    .col(ColumnDef::new(Events::SourceEnvironment).string())
                    .col(ColumnDef::new(Events::UserId).string())
                    .col(ColumnDef::new(Events::StatusCode).integer())
                    .col(ColumnDef::new(Events::ResponseTimeMs).double())
                    .col(ColumnDef::new(Events::RequestSizeBytes).big_integer())
                    .col(ColumnDef::new(Events::ResponseSizeBytes).big_integer())
                    .col(ColumnDef::new(Events::CacheHit).boolean())
                    .col(ColumnDef::new(Events::Context).json())
                    .col(ColumnDef::new(Events::Tags).text())
                    .col(ColumnDef::new(Events::Payload).json())
                    .col(
                        ColumnDef::new(Events::ProcessingStatus)
                            .string()
                            .not_null()
                            .default("queued"),
                    )
                    .col(ColumnDef::new(Events::ProcessedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Events::Deleted).boolean().not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_tenant_id")
                            .from(Events::Table, Events::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Partial unique index backing idempotent re-submission. A full unique
        // index would reject every NULL external_id after the first, so this
        // must stay partial. SeaQuery's index builder cannot express the WHERE
        // clause; the raw statement below is valid on both SQLite and Postgres.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_events_tenant_external_id \
                 ON events (tenant_id, external_id) \
                 WHERE external_id IS NOT NULL AND deleted = FALSE",
            )
            .await?;

        // Composite index driving the default search ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_events_tenant_occurred_at")
                    .table(Events::Table)
                    .col(Events::TenantId)
                    .col((Events::OccurredAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_tenant_event_type")
                    .table(Events::Table)
                    .col(Events::TenantId)
                    .col(Events::EventType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_tenant_source_service")
                    .table(Events::Table)
                    .col(Events::TenantId)
                    .col(Events::SourceService)
                    .to_owned(),
            )
            .await?;

        // The sweeper scans for stale queued rows by status
        manager
            .create_index(
                Index::create()
                    .name("idx_events_processing_status")
                    .table(Events::Table)
                    .col(Events::ProcessingStatus)
                    .col(Events::ReceivedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    TenantId,
    ExternalId,
    EventType,
    Severity,
    Title,
    Message,
    OccurredAt,
    ReceivedAt,
    SourceService,
    SourceEndpoint,
    SourceMethod,
    SourceVersion,
    SourceEnvironment,
    UserId,
    StatusCode,
    ResponseTimeMs,
    RequestSizeBytes,
    ResponseSizeBytes,
    CacheHit,
    Context,
    Tags,
    Payload,
    ProcessingStatus,
    ProcessedAt,
    Deleted,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
