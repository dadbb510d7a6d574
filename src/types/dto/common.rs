use poem_openapi::Object;

/// Response model for health check endpoint
#[derive(Object, Debug)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,

    /// Timestamp of the health check (ISO 8601 format)
    pub timestamp: String,
}

/// Response model for operations that only confirm an effect
#[derive(Object, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

/// One field that failed validation
#[derive(Object, Debug, Clone, PartialEq)]
pub struct FieldViolation {
    /// Path of the offending field (e.g. `source.service`, `events[5].title`)
    pub path: String,

    /// What was wrong with it
    pub message: String,
}

/// Structured detail attached to some error kinds
#[derive(Object, Debug, Clone, Default)]
pub struct ErrorDetails {
    /// Validation failures, one entry per offending field
    pub fields: Option<Vec<FieldViolation>>,

    /// Seconds until the current rate-limit window resets
    pub retry_after_seconds: Option<u64>,
}

/// Machine-readable error descriptor
#[derive(Object, Debug, Clone)]
pub struct ErrorDetail {
    /// Stable error kind string (e.g. `invalid_event`, `rate_limited`)
    pub kind: String,

    /// Human-readable error message
    pub message: String,

    /// Optional structured details
    pub details: Option<ErrorDetails>,
}

/// Standardized error response envelope
#[derive(Object, Debug, Clone)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}
