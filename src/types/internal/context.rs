use std::net::IpAddr;

use uuid::Uuid;

/// Unique identifier for one inbound request, generated at the edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Request context that flows through all layers
///
/// Carries the generated request id and client address for logging, plus the
/// authenticated tenant once the credential has been resolved. Handlers build
/// it before dispatching into a coordinator.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// Tenant resolved from the presented credential
    pub tenant_id: String,
}

impl RequestContext {
    pub fn new(ip_address: Option<IpAddr>, tenant_id: impl Into<String>) -> Self {
        Self {
            request_id: RequestId(Uuid::new_v4()),
            ip_address,
            tenant_id: tenant_id.into(),
        }
    }
}
