use std::collections::HashMap;

use poem_openapi::{payload::Json, ApiResponse, Object};
use serde_json::Value;

use crate::types::dto::common::ErrorBody;

/// One stored event as returned by the query surface
#[derive(Object, Debug, Clone)]
pub struct EventRecord {
    /// Server-assigned event id
    pub id: String,

    /// Client-supplied external id, if one was submitted
    pub event_id: Option<String>,

    pub event_type: String,
    pub severity: String,
    pub title: String,
    pub message: Option<String>,

    /// Occurrence instant (ISO 8601, UTC)
    pub timestamp: String,

    /// Server receipt instant (ISO 8601, UTC)
    pub ingested_at: String,

    pub service: String,
    pub endpoint: Option<String>,
    pub environment: Option<String>,

    pub user_id: Option<String>,
    pub status_code: Option<i32>,
    pub response_time_ms: Option<f64>,

    pub tags: Option<HashMap<String, String>>,
    pub payload: Option<Value>,

    pub processing_status: String,
}

/// Response for event search
#[derive(Object, Debug, Clone)]
pub struct EventSearchResponse {
    /// Matching events, ordered by occurrence time
    pub events: Vec<EventRecord>,

    /// Total-matches estimate across all pages
    pub total: u64,

    pub limit: u64,
    pub offset: u64,
}

/// Aggregate counts over a time window
#[derive(Object, Debug, Clone)]
pub struct EventStatsResponse {
    /// Width of the aggregation window in hours
    pub window_hours: u32,

    /// Events in the window
    pub total_events: u64,

    /// Counts grouped by event type
    pub by_event_type: HashMap<String, u64>,

    /// Counts grouped by severity
    pub by_severity: HashMap<String, u64>,
}

/// Responses of the search endpoint
#[derive(ApiResponse, Debug)]
pub enum SearchApiResponse {
    #[oai(status = 200)]
    Ok(Json<EventSearchResponse>),

    /// Malformed filter (unknown enum value, bad timestamp, limit out of range)
    #[oai(status = 400)]
    BadRequest(Json<ErrorBody>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorBody>),

    #[oai(status = 500)]
    Internal(Json<ErrorBody>),

    #[oai(status = 503)]
    Unavailable(Json<ErrorBody>),
}

/// Responses of the single-event fetch endpoint
#[derive(ApiResponse, Debug)]
pub enum GetEventApiResponse {
    #[oai(status = 200)]
    Ok(Json<EventRecord>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorBody>),

    /// No such event for the authenticated tenant
    #[oai(status = 404)]
    NotFound(Json<ErrorBody>),

    #[oai(status = 500)]
    Internal(Json<ErrorBody>),

    #[oai(status = 503)]
    Unavailable(Json<ErrorBody>),
}

/// Responses of the stats endpoint
#[derive(ApiResponse, Debug)]
pub enum StatsApiResponse {
    #[oai(status = 200)]
    Ok(Json<EventStatsResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorBody>),

    #[oai(status = 500)]
    Internal(Json<ErrorBody>),

    #[oai(status = 503)]
    Unavailable(Json<ErrorBody>),
}
