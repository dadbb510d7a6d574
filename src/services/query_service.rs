use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::errors::internal::ValidationFailure;
use crate::errors::IngestError;
use crate::stores::{EventStore, SearchFilter};
use crate::types::db::event;
use crate::types::dto::common::FieldViolation;
use crate::types::dto::query::{EventRecord, EventSearchResponse, EventStatsResponse};
use crate::types::internal::{EventKind, Severity};

const DEFAULT_PAGE_SIZE: u64 = 100;
const MAX_PAGE_SIZE: u64 = 1000;
const DEFAULT_STATS_WINDOW_HOURS: u32 = 24;

/// Raw, unchecked search parameters as they arrive from the query string
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub event_type: Option<String>,
    pub severity: Option<String>,
    pub service: Option<String>,
    pub endpoint: Option<String>,
    pub status_code: Option<i32>,
    pub user_id: Option<String>,
    pub event_id: Option<String>,
    /// Tag equality filter in `key:value` form
    pub tag: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Free-text match over title and message
    pub q: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// `asc` or `desc` (default) by occurrence time
    pub sort: Option<String>,
}

/// Filtered search and aggregate statistics over the stored stream
///
/// Tenant scoping lives in the store; this layer parses and bounds the
/// filter, and shapes rows into response objects.
pub struct QueryService {
    db: DatabaseConnection,
    store: EventStore,
}

impl QueryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            store: EventStore::new(),
        }
    }

    pub async fn search(
        &self,
        tenant_id: &str,
        params: &SearchParams,
    ) -> Result<EventSearchResponse, IngestError> {
        let filter = parse_filter(params)?;

        let (events, total) = self
            .store
            .search(&self.db, tenant_id, &filter)
            .await
            .map_err(IngestError::Database)?;

        Ok(EventSearchResponse {
            events: events.into_iter().map(to_record).collect(),
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    /// Fetch one event; the identifier is resolved first as a server id,
    /// then as a client-supplied external id, so every id an ingest response
    /// ever returned stays retrievable.
    pub async fn event_by_id(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> Result<EventRecord, IngestError> {
        if let Some(row) = self
            .store
            .find_by_id(&self.db, tenant_id, id)
            .await
            .map_err(IngestError::Database)?
        {
            return Ok(to_record(row));
        }

        if let Some(row) = self
            .store
            .find_by_external_id(&self.db, tenant_id, id)
            .await
            .map_err(IngestError::Database)?
        {
            return Ok(to_record(row));
        }

        Err(IngestError::NotFound)
    }

    pub async fn stats(
        &self,
        tenant_id: &str,
        window_hours: Option<u32>,
    ) -> Result<EventStatsResponse, IngestError> {
        let window_hours = window_hours.unwrap_or(DEFAULT_STATS_WINDOW_HOURS);
        let since = Utc::now() - Duration::hours(window_hours as i64);

        let aggregates = self
            .store
            .aggregate_stats(&self.db, tenant_id, since)
            .await
            .map_err(IngestError::Database)?;

        Ok(EventStatsResponse {
            window_hours,
            total_events: aggregates.total,
            by_event_type: aggregates.by_kind,
            by_severity: aggregates.by_severity,
        })
    }
}

fn parse_filter(params: &SearchParams) -> Result<SearchFilter, IngestError> {
    let mut violations: Vec<FieldViolation> = Vec::new();

    let kind = match params.event_type.as_deref() {
        None => None,
        Some(raw) => match EventKind::parse(raw) {
            Some(kind) => Some(kind),
            None => {
                violations.push(bad_param("event_type", format!("unknown value '{}'", raw)));
                None
            }
        },
    };

    let severity = match params.severity.as_deref() {
        None => None,
        Some(raw) => match Severity::parse(raw) {
            Some(severity) => Some(severity),
            None => {
                violations.push(bad_param("severity", format!("unknown value '{}'", raw)));
                None
            }
        },
    };

    let tag = match params.tag.as_deref() {
        None => None,
        Some(raw) => match raw.split_once(':') {
            Some((key, value)) if !key.is_empty() => Some((key.to_string(), value.to_string())),
            _ => {
                violations.push(bad_param("tag", "expected key:value"));
                None
            }
        },
    };

    let occurred_from = parse_time_param("start_time", &params.start_time, &mut violations);
    let occurred_to = parse_time_param("end_time", &params.end_time, &mut violations);

    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if limit == 0 || limit > MAX_PAGE_SIZE {
        violations.push(bad_param(
            "limit",
            format!("must be between 1 and {}", MAX_PAGE_SIZE),
        ));
    }

    let ascending = match params.sort.as_deref() {
        None | Some("desc") => false,
        Some("asc") => true,
        Some(other) => {
            violations.push(bad_param("sort", format!("unknown direction '{}'", other)));
            false
        }
    };

    if !violations.is_empty() {
        return Err(IngestError::Validation(ValidationFailure::new(violations)));
    }

    Ok(SearchFilter {
        kind,
        severity,
        service: params.service.clone(),
        endpoint: params.endpoint.clone(),
        status_code: params.status_code,
        user_id: params.user_id.clone(),
        external_id: params.event_id.clone(),
        tag,
        occurred_from,
        occurred_to,
        text: params.q.clone(),
        limit,
        offset: params.offset.unwrap_or(0),
        ascending,
    })
}

fn parse_time_param(
    name: &str,
    raw: &Option<String>,
    violations: &mut Vec<FieldViolation>,
) -> Option<DateTime<Utc>> {
    let raw = raw.as_deref()?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(instant) => Some(instant.with_timezone(&Utc)),
        Err(_) => {
            violations.push(bad_param(name, "is not a valid ISO 8601 instant"));
            None
        }
    }
}

fn bad_param(path: &str, message: impl Into<String>) -> FieldViolation {
    FieldViolation {
        path: path.to_string(),
        message: message.into(),
    }
}

fn to_record(row: event::Model) -> EventRecord {
    let tags: Option<HashMap<String, String>> = row
        .tags
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok());

    EventRecord {
        id: row.id,
        event_id: row.external_id,
        event_type: row.event_type,
        severity: row.severity,
        title: row.title,
        message: row.message,
        timestamp: row.occurred_at.to_rfc3339(),
        ingested_at: row.received_at.to_rfc3339(),
        service: row.source_service,
        endpoint: row.source_endpoint,
        environment: row.source_environment,
        user_id: row.user_id,
        status_code: row.status_code,
        response_time_ms: row.response_time_ms,
        tags,
        payload: row.payload,
        processing_status: row.processing_status,
    }
}
