use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Closed set of event classifications accepted by the ingest surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ApiCall,
    Error,
    UserAction,
    CustomEvent,
    System,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::ApiCall,
        EventKind::Error,
        EventKind::UserAction,
        EventKind::CustomEvent,
        EventKind::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ApiCall => "api_call",
            EventKind::Error => "error",
            EventKind::UserAction => "user_action",
            EventKind::CustomEvent => "custom_event",
            EventKind::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == value)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event processing lifecycle. The write path only ever sets `Queued`; all
/// other transitions belong to the downstream worker and the sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    Queued,
    Processing,
    Processed,
    Failed,
}

impl ProcessingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingState::Queued => "queued",
            ProcessingState::Processing => "processing",
            ProcessingState::Processed => "processed",
            ProcessingState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized source descriptor carried by a validated event
#[derive(Debug, Clone)]
pub struct ValidatedSource {
    pub service: String,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub version: Option<String>,
    pub environment: Option<String>,
}

/// Normalized request context carried by a validated event
#[derive(Debug, Clone, Default)]
pub struct ValidatedContext {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub request_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// BTreeMap so the serialized form is deterministic
    pub tags: BTreeMap<String, String>,
}

/// Normalized metrics carried by a validated event
#[derive(Debug, Clone, Default)]
pub struct ValidatedMetrics {
    pub response_time_ms: Option<f64>,
    pub status_code: Option<i32>,
    pub request_size_bytes: Option<i64>,
    pub response_size_bytes: Option<i64>,
    pub cache_hit: Option<bool>,
}

/// Output of the validator: a submission with every field checked and
/// normalized, ready for the coordinator to persist.
#[derive(Debug, Clone)]
pub struct ValidatedEvent {
    pub external_id: Option<String>,
    pub kind: EventKind,
    pub severity: Severity,
    pub title: String,
    pub message: Option<String>,
    /// Resolved occurrence instant; the server receipt time when the client
    /// did not supply one.
    pub occurred_at: DateTime<Utc>,
    pub source: ValidatedSource,
    pub context: Option<ValidatedContext>,
    pub metrics: Option<ValidatedMetrics>,
    pub payload: Option<Value>,
}
