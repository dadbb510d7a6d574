use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::errors::DatabaseError;
use crate::types::db::event::{self, Entity as Event};
use crate::types::internal::{EventKind, ProcessingState, Severity, ValidatedEvent};

/// Filter for the search surface
///
/// Every predicate is optional and conjunctive. `limit` is expected to be
/// bounded by the caller (the query service enforces the 1000 ceiling).
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub kind: Option<EventKind>,
    pub severity: Option<Severity>,
    pub service: Option<String>,
    pub endpoint: Option<String>,
    pub status_code: Option<i32>,
    pub user_id: Option<String>,
    pub external_id: Option<String>,
    /// Tag equality: the event's tag map must contain exactly this pair
    pub tag: Option<(String, String)>,
    pub occurred_from: Option<DateTime<Utc>>,
    pub occurred_to: Option<DateTime<Utc>>,
    /// Free-text match over title and message
    pub text: Option<String>,
    pub limit: u64,
    pub offset: u64,
    pub ascending: bool,
}

/// Aggregate counts for the stats surface
#[derive(Debug, Clone, Default)]
pub struct StatAggregates {
    pub total: u64,
    pub by_kind: HashMap<String, u64>,
    pub by_severity: HashMap<String, u64>,
}

#[derive(FromQueryResult)]
struct GroupCount {
    group: String,
    count: i64,
}

/// Repository for event rows
///
/// Stateless; the ingestion coordinator threads its transaction handle
/// through `insert`, everything else runs on the shared connection.
pub struct EventStore;

impl EventStore {
    pub fn new() -> Self {
        Self
    }

    /// Base query scoping every read to one tenant's live rows. All query
    /// paths below go through this; there is no way to search another
    /// tenant's data or resurrect soft-deleted rows from here.
    fn scoped(tenant_id: &str) -> sea_orm::Select<Event> {
        Event::find()
            .filter(event::Column::TenantId.eq(tenant_id))
            .filter(event::Column::Deleted.eq(false))
    }

    /// Insert one event row. A collision on the partial unique index over
    /// (tenant_id, external_id) surfaces as `DatabaseError::UniqueViolation`
    /// for the coordinator's late-duplicate recovery path.
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        tenant_id: &str,
        server_id: &str,
        received_at: DateTime<Utc>,
        validated: &ValidatedEvent,
    ) -> Result<event::Model, DatabaseError> {
        let (context_json, tags_text, user_id) = match &validated.context {
            Some(ctx) => {
                let json = serde_json::json!({
                    "user_id": ctx.user_id,
                    "session_id": ctx.session_id,
                    "request_id": ctx.request_id,
                    "ip_address": ctx.ip_address,
                    "user_agent": ctx.user_agent,
                    "tags": ctx.tags,
                });
                let tags = if ctx.tags.is_empty() {
                    None
                } else {
                    // Compact serialization; the BTreeMap keeps key order stable
                    Some(serde_json::to_string(&ctx.tags).unwrap_or_default())
                };
                (Some(json), tags, ctx.user_id.clone())
            }
            None => (None, None, None),
        };

        let metrics = validated.metrics.clone().unwrap_or_default();

        let row = event::ActiveModel {
            id: Set(server_id.to_string()),
            tenant_id: Set(tenant_id.to_string()),
            external_id: Set(validated.external_id.clone()),
            event_type: Set(validated.kind.as_str().to_string()),
            severity: Set(validated.severity.as_str().to_string()),
            title: Set(validated.title.clone()),
            message: Set(validated.message.clone()),
            occurred_at: Set(validated.occurred_at),
            received_at: Set(received_at),
            source_service: Set(validated.source.service.clone()),
            source_endpoint: Set(validated.source.endpoint.clone()),
            source_method: Set(validated.source.method.clone()),
            source_version: Set(validated.source.version.clone()),
            source_environment: Set(validated.source.environment.clone()),
            user_id: Set(user_id),
            status_code: Set(metrics.status_code),
            response_time_ms: Set(metrics.response_time_ms),
            request_size_bytes: Set(metrics.request_size_bytes),
            response_size_bytes: Set(metrics.response_size_bytes),
            cache_hit: Set(metrics.cache_hit),
            context: Set(context_json),
            tags: Set(tags_text),
            payload: Set(validated.payload.clone()),
            processing_status: Set(ProcessingState::Queued.as_str().to_string()),
            processed_at: Set(None),
            deleted: Set(false),
        };

        Event::insert(row)
            .exec_with_returning(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("insert_event", e))
    }

    /// Single indexed read backing the deduplicator
    pub async fn find_by_external_id(
        &self,
        conn: &impl ConnectionTrait,
        tenant_id: &str,
        external_id: &str,
    ) -> Result<Option<event::Model>, DatabaseError> {
        Self::scoped(tenant_id)
            .filter(event::Column::ExternalId.eq(external_id))
            .one(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("find_event_by_external_id", e))
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        tenant_id: &str,
        server_id: &str,
    ) -> Result<Option<event::Model>, DatabaseError> {
        Self::scoped(tenant_id)
            .filter(event::Column::Id.eq(server_id))
            .one(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("find_event_by_id", e))
    }

    /// Soft-delete one row. Archived rows vanish from every tenant-scoped
    /// read and release their external id for re-use (the unique index is
    /// partial over live rows).
    pub async fn mark_deleted(
        &self,
        conn: &impl ConnectionTrait,
        tenant_id: &str,
        server_id: &str,
    ) -> Result<bool, DatabaseError> {
        let result = Event::update_many()
            .col_expr(event::Column::Deleted, Expr::value(true))
            .filter(event::Column::TenantId.eq(tenant_id))
            .filter(event::Column::Id.eq(server_id))
            .filter(event::Column::Deleted.eq(false))
            .exec(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("mark_event_deleted", e))?;

        Ok(result.rows_affected > 0)
    }

    /// Filtered page plus a total-matches count
    pub async fn search(
        &self,
        conn: &impl ConnectionTrait,
        tenant_id: &str,
        filter: &SearchFilter,
    ) -> Result<(Vec<event::Model>, u64), DatabaseError> {
        let mut query = Self::scoped(tenant_id);

        if let Some(kind) = filter.kind {
            query = query.filter(event::Column::EventType.eq(kind.as_str()));
        }
        if let Some(severity) = filter.severity {
            query = query.filter(event::Column::Severity.eq(severity.as_str()));
        }
        if let Some(service) = &filter.service {
            query = query.filter(event::Column::SourceService.eq(service));
        }
        if let Some(endpoint) = &filter.endpoint {
            query = query.filter(event::Column::SourceEndpoint.eq(endpoint));
        }
        if let Some(status_code) = filter.status_code {
            query = query.filter(event::Column::StatusCode.eq(status_code));
        }
        if let Some(user_id) = &filter.user_id {
            query = query.filter(event::Column::UserId.eq(user_id));
        }
        if let Some(external_id) = &filter.external_id {
            query = query.filter(event::Column::ExternalId.eq(external_id));
        }
        if let Some((key, value)) = &filter.tag {
            // Tags are stored as a compact JSON object, so pair equality is a
            // substring match on the canonical `"key":"value"` form.
            let needle = format!(
                "{}:{}",
                serde_json::to_string(key).unwrap_or_default(),
                serde_json::to_string(value).unwrap_or_default()
            );
            query = query.filter(event::Column::Tags.contains(needle));
        }
        if let Some(from) = filter.occurred_from {
            query = query.filter(event::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.occurred_to {
            query = query.filter(event::Column::OccurredAt.lte(to));
        }
        if let Some(text) = &filter.text {
            query = query.filter(
                Condition::any()
                    .add(event::Column::Title.contains(text.as_str()))
                    .add(event::Column::Message.contains(text.as_str())),
            );
        }

        let total = query
            .clone()
            .count(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("count_events", e))?;

        let direction = if filter.ascending { Order::Asc } else { Order::Desc };
        let events = query
            .order_by(event::Column::OccurredAt, direction)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("search_events", e))?;

        Ok((events, total))
    }

    /// Counts grouped by event type and severity over a time window
    pub async fn aggregate_stats(
        &self,
        conn: &impl ConnectionTrait,
        tenant_id: &str,
        since: DateTime<Utc>,
    ) -> Result<StatAggregates, DatabaseError> {
        let windowed = Self::scoped(tenant_id).filter(event::Column::OccurredAt.gte(since));

        let total = windowed
            .clone()
            .count(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("stats_total", e))?;

        let by_kind = windowed
            .clone()
            .select_only()
            .column_as(event::Column::EventType, "group")
            .column_as(event::Column::Id.count(), "count")
            .group_by(event::Column::EventType)
            .into_model::<GroupCount>()
            .all(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("stats_by_kind", e))?;

        let by_severity = windowed
            .select_only()
            .column_as(event::Column::Severity, "group")
            .column_as(event::Column::Id.count(), "count")
            .group_by(event::Column::Severity)
            .into_model::<GroupCount>()
            .all(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("stats_by_severity", e))?;

        Ok(StatAggregates {
            total,
            by_kind: by_kind
                .into_iter()
                .map(|row| (row.group, row.count as u64))
                .collect(),
            by_severity: by_severity
                .into_iter()
                .map(|row| (row.group, row.count as u64))
                .collect(),
        })
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}
