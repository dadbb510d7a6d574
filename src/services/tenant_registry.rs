use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use sea_orm::DatabaseConnection;
use sha2::{Digest, Sha256};

use crate::errors::internal::AuthRejection;
use crate::errors::IngestError;
use crate::stores::TenantStore;
use crate::types::db::tenant;

/// How long a positive credential lookup may be served from memory. Must
/// stay well under a minute so deactivation propagates quickly even without
/// an explicit invalidation.
const CACHE_TTL: Duration = Duration::from_secs(30);

struct CachedTenant {
    tenant: tenant::Model,
    cached_at: Instant,
}

/// Resolves API credentials to tenants and enforces the active flag
///
/// Lookups go through a process-local, read-mostly cache keyed by the
/// credential's SHA-256 so the hot ingest path usually skips the store.
/// Only active tenants are cached; the administrative deactivation flow
/// calls `invalidate`.
pub struct TenantRegistry {
    db: DatabaseConnection,
    store: TenantStore,
    cache: RwLock<HashMap<[u8; 32], CachedTenant>>,
}

impl TenantRegistry {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            store: TenantStore::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Authenticate a machine client by API credential
    ///
    /// Unknown credentials and inactive tenants both surface as
    /// `unauthorized`; the distinction only exists in the logs.
    pub async fn authenticate(&self, credential: &str) -> Result<tenant::Model, IngestError> {
        let cache_key = sha256(credential.as_bytes());

        if let Some(tenant) = self.cached(&cache_key) {
            return Ok(tenant);
        }

        let tenant = self
            .store
            .find_by_api_key(&self.db, credential)
            .await
            .map_err(IngestError::Database)?;

        let Some(tenant) = tenant else {
            tracing::warn!("Authentication failed: unknown API credential");
            return Err(IngestError::Unauthorized(AuthRejection::UnknownCredential));
        };

        // The index lookup already matched, but the equality that gates
        // admission must not be timeable.
        if !constant_time_eq(tenant.api_key.as_bytes(), credential.as_bytes()) {
            tracing::warn!("Authentication failed: credential mismatch after lookup");
            return Err(IngestError::Unauthorized(AuthRejection::UnknownCredential));
        }

        if !tenant.is_active {
            tracing::warn!(tenant_id = %tenant.id, "Authentication rejected: tenant is deactivated");
            return Err(IngestError::Unauthorized(AuthRejection::InactiveTenant));
        }

        self.cache.write().unwrap().insert(
            cache_key,
            CachedTenant {
                tenant: tenant.clone(),
                cached_at: Instant::now(),
            },
        );

        Ok(tenant)
    }

    /// Drop a cached lookup; called when a tenant is deactivated
    pub fn invalidate(&self, credential: &str) {
        let cache_key = sha256(credential.as_bytes());
        self.cache.write().unwrap().remove(&cache_key);
    }

    fn cached(&self, cache_key: &[u8; 32]) -> Option<tenant::Model> {
        let cache = self.cache.read().unwrap();
        let entry = cache.get(cache_key)?;
        if entry.cached_at.elapsed() > CACHE_TTL {
            return None;
        }
        Some(entry.tenant.clone())
    }
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Length-independent comparison: both sides are hashed to a fixed width and
/// the digests compared without early exit.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let da = sha256(a);
    let db = sha256(b);
    da.iter().zip(db.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
