pub mod auth;
pub mod health;
pub mod ingestion;

pub use auth::AuthApi;
pub use health::HealthApi;
pub use ingestion::IngestionApi;

use std::net::IpAddr;

use poem::Request;
use poem_openapi::auth::ApiKey;
use poem_openapi::SecurityScheme;

/// Per-tenant API key authentication for machine clients
#[derive(SecurityScheme, Debug)]
#[oai(ty = "api_key", key_name = "X-API-Key", key_in = "header")]
pub struct ApiKeyAuth(pub ApiKey);

/// Client address recorded in the request context. Deployments front the
/// service with a proxy, so the forwarding headers outrank the socket peer.
pub(crate) fn client_addr(req: &Request) -> Option<IpAddr> {
    let forwarded = req
        .header("X-Forwarded-For")
        .and_then(|chain| chain.split(',').next())
        .or_else(|| req.header("X-Real-IP"));

    match forwarded {
        Some(candidate) => candidate.trim().parse().ok(),
        None => req.remote_addr().as_socket_addr().map(|peer| peer.ip()),
    }
}
