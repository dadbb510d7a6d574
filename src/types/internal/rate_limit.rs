/// Outcome of one rate-limiter check
///
/// `current` is the post-increment counter value for the window; an
/// over-limit attempt still counts, so `current` may exceed `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    pub current: u64,
    pub remaining: u64,
    pub reset_after_secs: u64,
    /// Set when the cache was unreachable and the fail-open policy admitted
    /// the request unchecked.
    pub degraded: bool,
}

impl RateLimitDecision {
    /// Admission decision used when the cache is down and the limiter is
    /// configured to fail open.
    pub fn fail_open(limit: u64, window_secs: u64) -> Self {
        Self {
            allowed: true,
            limit,
            current: 0,
            remaining: limit,
            reset_after_secs: window_secs,
            degraded: true,
        }
    }
}
