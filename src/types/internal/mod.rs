pub mod context;
pub mod event;
pub mod rate_limit;

pub use context::{RequestContext, RequestId};
pub use event::{EventKind, ProcessingState, Severity, ValidatedEvent};
pub use rate_limit::RateLimitDecision;
