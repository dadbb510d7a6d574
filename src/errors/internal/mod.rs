use thiserror::Error;

pub mod cache;
pub mod database;

pub use cache::CacheError;
pub use database::DatabaseError;

use crate::types::dto::common::FieldViolation;

/// Why an authentication attempt was rejected
///
/// Inactive tenants are logged distinctly but produce the same client-facing
/// response as an unknown credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    UnknownCredential,
    InactiveTenant,
}

/// A validation pass that found one or more bad fields
#[derive(Error, Debug, Clone)]
#[error("Event validation failed on {} field(s)", violations.len())]
pub struct ValidationFailure {
    pub violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    pub fn single(path: &str, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation {
                path: path.to_string(),
                message: message.into(),
            }],
        }
    }
}

/// Closed error taxonomy of the core
///
/// Every component raises one of these kinds; only the API layer is allowed
/// to map them to HTTP statuses. The `kind()` strings are part of the wire
/// contract and must not change.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unauthorized")]
    Unauthorized(AuthRejection),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("Rate limit of {limit} events per minute exceeded")]
    RateLimited {
        limit: u64,
        current: u64,
        retry_after_secs: u64,
    },

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Conflicting write during {operation}")]
    Conflict { operation: String },

    #[error("Request deadline exceeded")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> Self {
        IngestError::Database(DatabaseError::from_db_err(operation, source))
    }

    /// Stable kind string surfaced in error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Unauthorized(_) => "unauthorized",
            IngestError::Validation(_) => "invalid_event",
            IngestError::RateLimited { .. } => "rate_limited",
            IngestError::NotFound => "not_found",
            IngestError::Database(db) if db.is_transient() => "store_unavailable",
            IngestError::Database(db) if db.is_unique_violation() => "conflict",
            IngestError::Database(_) => "internal",
            IngestError::Cache(_) => "cache_unavailable",
            IngestError::Conflict { .. } => "conflict",
            IngestError::Timeout => "timeout",
            IngestError::Internal(_) => "internal",
        }
    }

    /// Client-facing message. Internal details never leak here; operators get
    /// them from the logs.
    pub fn client_message(&self) -> String {
        match self {
            IngestError::Unauthorized(_) => "Invalid or missing credentials".to_string(),
            IngestError::Validation(failure) => {
                format!("Event validation failed on {} field(s)", failure.violations.len())
            }
            IngestError::RateLimited { limit, .. } => {
                format!("Rate limit of {} events per minute exceeded", limit)
            }
            IngestError::NotFound => "Event not found".to_string(),
            IngestError::Database(db) if db.is_transient() => {
                "Storage temporarily unavailable, retry later".to_string()
            }
            IngestError::Cache(_) => "Cache temporarily unavailable".to_string(),
            IngestError::Timeout => "Request deadline exceeded".to_string(),
            _ => "An internal error occurred".to_string(),
        }
    }
}
