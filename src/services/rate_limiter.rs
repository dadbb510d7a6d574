use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cache::WindowCounter;
use crate::errors::IngestError;
use crate::types::internal::RateLimitDecision;

/// Width of the fixed rate-limit window
pub const WINDOW_SECS: u64 = 60;

/// Fixed-window per-tenant rate limiter backed by the shared cache
///
/// The counter key embeds the current minute, so windows roll over without
/// any coordination; the atomic increment on the cache side is the only
/// serialization point. An over-limit request still consumed its increment.
pub struct RateLimiter {
    counter: Arc<dyn WindowCounter>,
    fail_open: bool,
}

impl RateLimiter {
    pub fn new(counter: Arc<dyn WindowCounter>, fail_open: bool) -> Self {
        Self { counter, fail_open }
    }

    /// Check and consume one slot of the tenant's minute window
    ///
    /// The limit is the tenant's own configured maximum; there is no global
    /// default overriding it.
    pub async fn check_and_increment(
        &self,
        tenant_id: &str,
        limit: u64,
    ) -> Result<RateLimitDecision, IngestError> {
        let now = Utc::now();
        let key = window_key(tenant_id, now);

        match self.counter.increment(&key, WINDOW_SECS).await {
            Ok(current) => Ok(RateLimitDecision {
                allowed: current <= limit,
                limit,
                current,
                remaining: limit.saturating_sub(current),
                reset_after_secs: seconds_until_reset(now),
                degraded: false,
            }),
            Err(err) if self.fail_open => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    error = %err,
                    "Cache unreachable, admitting request unchecked (fail-open)"
                );
                Ok(RateLimitDecision::fail_open(limit, WINDOW_SECS))
            }
            Err(err) => Err(IngestError::Cache(err)),
        }
    }
}

fn window_key(tenant_id: &str, now: DateTime<Utc>) -> String {
    format!("ratelimit:{}:{}", tenant_id, now.timestamp() / WINDOW_SECS as i64)
}

fn seconds_until_reset(now: DateTime<Utc>) -> u64 {
    WINDOW_SECS - (now.timestamp() as u64 % WINDOW_SECS)
}
