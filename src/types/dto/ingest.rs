use std::collections::HashMap;

use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::dto::common::{ErrorBody, MessageResponse};

/// Source descriptor of a submitted event
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct EventSource {
    /// Name of the emitting service
    pub service: Option<String>,

    /// API endpoint the event relates to
    pub endpoint: Option<String>,

    /// HTTP method, if applicable
    pub method: Option<String>,

    /// Version of the emitting service
    pub version: Option<String>,

    /// Deployment environment (dev, staging, prod)
    pub environment: Option<String>,
}

/// Contextual information attached to a submitted event
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct EventContext {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub request_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,

    /// Custom tags for categorization
    pub tags: Option<HashMap<String, String>>,
}

/// Performance metrics attached to a submitted event
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct EventMetrics {
    /// Response time in milliseconds
    pub response_time_ms: Option<f64>,

    /// HTTP status code, 100..=599
    pub status_code: Option<i32>,

    /// Request size in bytes
    pub request_size_bytes: Option<i64>,

    /// Response size in bytes
    pub response_size_bytes: Option<i64>,

    /// Whether the response was served from cache
    pub cache_hit: Option<bool>,
}

/// One event submission
///
/// Required fields are modeled as options so the validator can report every
/// missing field in one structured response instead of failing at parse time.
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct EventSubmission {
    /// Event classification (api_call, error, user_action, custom_event, system)
    pub event_type: Option<String>,

    /// Client-supplied stable id used for idempotent re-submission
    pub event_id: Option<String>,

    /// ISO 8601 occurrence instant; defaults to the server receipt time
    pub timestamp: Option<String>,

    /// Short event title
    pub title: Option<String>,

    /// Longer event description
    pub message: Option<String>,

    /// Severity level (debug, info, warning, error, critical); defaults to info
    pub severity: Option<String>,

    /// Where the event originated
    pub source: Option<EventSource>,

    /// Who/what triggered the event
    pub context: Option<EventContext>,

    /// Performance metrics, mostly for api_call events
    pub metrics: Option<EventMetrics>,

    /// Arbitrary structured payload
    pub payload: Option<Value>,
}

/// Batch submission envelope
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct BatchSubmission {
    /// Events to ingest, at most the configured batch maximum
    pub events: Vec<EventSubmission>,
}

/// Response for a single event ingestion
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct EventIngestionResponse {
    pub success: bool,

    /// Client-facing event identifier: the submitted external id when one was
    /// given, otherwise the server-assigned id
    pub event_id: String,

    /// When the event was durably stored (ISO 8601)
    pub ingested_at: String,

    /// Present and true when this submission matched an already-stored event
    pub duplicate: Option<bool>,
}

/// Outcome of one element of a batch submission
#[derive(Object, Debug, Clone)]
pub struct BatchItemOutcome {
    /// Position of the element in the submitted batch
    pub index: u32,

    pub success: bool,

    /// Client-facing event identifier, present on success
    pub event_id: Option<String>,

    /// Present and true when the element matched an already-stored event
    pub duplicate: Option<bool>,

    /// Failure descriptor, present when success is false
    pub error: Option<crate::types::dto::common::ErrorDetail>,
}

/// Response for a batch ingestion
#[derive(Object, Debug, Clone)]
pub struct BatchIngestionResponse {
    /// Number of elements submitted
    pub total_count: u32,

    /// Elements stored (idempotent duplicates included)
    pub successful_count: u32,

    /// Elements rejected
    pub failed_count: u32,

    /// When the batch finished processing (ISO 8601)
    pub ingested_at: String,

    /// Per-element outcomes, parallel to the submitted list
    pub results: Vec<BatchItemOutcome>,
}

/// Responses of the single-event ingestion endpoint
#[derive(ApiResponse, Debug)]
pub enum IngestEventApiResponse {
    /// Event stored (or already present, see the duplicate flag)
    #[oai(status = 200)]
    Ok(Json<EventIngestionResponse>),

    /// Validation failed; details list every offending field
    #[oai(status = 400)]
    BadRequest(Json<ErrorBody>),

    /// Missing, unknown, or inactive credential
    #[oai(status = 401)]
    Unauthorized(Json<ErrorBody>),

    /// Per-tenant minute window exceeded
    #[oai(status = 429)]
    RateLimited(Json<ErrorBody>),

    /// Unclassified failure
    #[oai(status = 500)]
    Internal(Json<ErrorBody>),

    /// Relational store transiently unavailable
    #[oai(status = 503)]
    Unavailable(Json<ErrorBody>),

    /// Request deadline expired before commit
    #[oai(status = 504)]
    Timeout(Json<ErrorBody>),
}

/// Responses of the event soft-delete endpoint
#[derive(ApiResponse, Debug)]
pub enum DeleteEventApiResponse {
    /// Event archived; its external id is free for re-use
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),

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

/// Responses of the reprocessing-retry endpoint
#[derive(ApiResponse, Debug)]
pub enum RetryEventApiResponse {
    /// Event re-queued for the downstream worker
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorBody>),

    /// No such event for the authenticated tenant
    #[oai(status = 404)]
    NotFound(Json<ErrorBody>),

    #[oai(status = 500)]
    Internal(Json<ErrorBody>),

    /// The hand-off queue is unreachable
    #[oai(status = 503)]
    Unavailable(Json<ErrorBody>),
}

/// Responses of the batch ingestion endpoint
#[derive(ApiResponse, Debug)]
pub enum BatchIngestApiResponse {
    /// At least one element succeeded; see per-element outcomes
    #[oai(status = 200)]
    Ok(Json<BatchIngestionResponse>),

    /// Envelope invalid, or every element failed validation
    #[oai(status = 400)]
    BadRequest(Json<ErrorBody>),

    /// Missing, unknown, or inactive credential
    #[oai(status = 401)]
    Unauthorized(Json<ErrorBody>),

    /// Unclassified failure
    #[oai(status = 500)]
    Internal(Json<ErrorBody>),

    /// Relational store transiently unavailable
    #[oai(status = 503)]
    Unavailable(Json<ErrorBody>),

    /// Request deadline expired
    #[oai(status = 504)]
    Timeout(Json<ErrorBody>),
}
