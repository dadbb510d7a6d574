use thiserror::Error;

/// Errors raised by the shared key-value cache
///
/// These never surface to clients directly: the rate limiter either fails
/// open (degraded admission) or maps them to `cache_unavailable`.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache unreachable during {operation}: {message}")]
    Unavailable { operation: String, message: String },

    #[error("Cache operation {operation} exceeded the request deadline")]
    Timeout { operation: String },
}

impl CacheError {
    pub fn unavailable(operation: &str, err: impl std::fmt::Display) -> Self {
        CacheError::Unavailable {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}
