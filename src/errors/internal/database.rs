use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors raised by relational store operations
///
/// Unique violations are pulled out into their own variant because the
/// ingestion coordinator treats a violation on (tenant_id, external_id) as a
/// late-arriving duplicate rather than a failure.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error during {operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: DbErr,
    },

    #[error("Unique constraint violated during {operation}")]
    UniqueViolation { operation: String },

    #[error("Database operation {operation} exceeded the request deadline")]
    Timeout { operation: String },
}

impl DatabaseError {
    /// Classify a SeaORM error, separating unique violations from the rest
    pub fn from_db_err(operation: &str, source: DbErr) -> Self {
        if matches!(source.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return DatabaseError::UniqueViolation {
                operation: operation.to_string(),
            };
        }
        DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation { .. })
    }

    /// Whether the failure looks transient (connection-level), i.e. the
    /// client may retry and the surface should be 503 rather than 500.
    pub fn is_transient(&self) -> bool {
        match self {
            DatabaseError::Operation { source, .. } => matches!(
                source,
                DbErr::Conn(_) | DbErr::ConnectionAcquire(_)
            ),
            DatabaseError::Timeout { .. } => true,
            DatabaseError::UniqueViolation { .. } => false,
        }
    }
}
