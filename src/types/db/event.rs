use sea_orm::entity::prelude::*;

/// SeaORM entity for the events table
///
/// Rows are immutable after insert except for `processing_status` /
/// `processed_at` (owned by the downstream worker) and the soft-delete flag.
/// Filterable attributes are extracted into their own columns; the raw
/// submission context and payload ride along as JSON.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tenant_id: String,
    pub external_id: Option<String>,
    pub event_type: String,
    pub severity: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub received_at: DateTimeUtc,
    pub source_service: String,
    pub source_endpoint: Option<String>,
    pub source_method: Option<String>,
    pub source_version: Option<String>,
    pub source_environment: Option<String>,
    pub user_id: Option<String>,
    pub status_code: Option<i32>,
    pub response_time_ms: Option<f64>,
    pub request_size_bytes: Option<i64>,
    pub response_size_bytes: Option<i64>,
    pub cache_hit: Option<bool>,
    pub context: Option<Json>,
    /// Compact JSON object serialization of the tag map, kept as text so tag
    /// equality filters can use an indexable LIKE predicate on any backend.
    #[sea_orm(column_type = "Text", nullable)]
    pub tags: Option<String>,
    pub payload: Option<Json>,
    pub processing_status: String,
    pub processed_at: Option<DateTimeUtc>,
    pub deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id"
    )]
    Tenant,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
