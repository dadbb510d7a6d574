use std::sync::Arc;

use redis::aio::ConnectionManager;
use sea_orm::DatabaseConnection;

use crate::cache::{EventQueue, RedisEventQueue, RedisWindowCounter, WindowCounter};
use crate::config::ApplicationSettings;
use crate::coordinators::{BatchCoordinator, IngestCoordinator};
use crate::services::{
    AuthService, EventValidator, QueryService, RateLimiter, TenantRegistry, TokenService,
};

/// Centralized application data containing the store connection and all
/// long-lived services
///
/// Everything is created once at startup and shared behind `Arc`s; endpoint
/// structs extract the pieces they need. No service holds business data in
/// process memory beyond the registry's short-TTL credential cache.
pub struct AppData {
    pub db: DatabaseConnection,
    pub settings: ApplicationSettings,
    pub tenant_registry: Arc<TenantRegistry>,
    pub ingest_coordinator: Arc<IngestCoordinator>,
    pub batch_coordinator: Arc<BatchCoordinator>,
    pub query_service: Arc<QueryService>,
    pub auth_service: Arc<AuthService>,
}

impl AppData {
    /// Wire the production stack: Redis-backed rate limiting and hand-off
    pub fn init(
        db: DatabaseConnection,
        cache: ConnectionManager,
        settings: ApplicationSettings,
    ) -> Self {
        let counter = Arc::new(RedisWindowCounter::new(cache.clone()));
        let queue = Arc::new(RedisEventQueue::new(cache));
        Self::with_parts(db, settings, counter, queue)
    }

    /// Wire the stack with explicit cache seams; tests use the in-memory
    /// counter and queue implementations here.
    pub fn with_parts(
        db: DatabaseConnection,
        settings: ApplicationSettings,
        counter: Arc<dyn WindowCounter>,
        queue: Arc<dyn EventQueue>,
    ) -> Self {
        let tenant_registry = Arc::new(TenantRegistry::new(db.clone()));

        let rate_limiter = Arc::new(RateLimiter::new(counter, settings.rate_limiter_fail_open));
        let validator = EventValidator::new(
            settings.clock_skew_tolerance_secs,
            settings.retention_horizon_days,
            settings.max_payload_size_bytes,
        );
        let ingest_coordinator = Arc::new(IngestCoordinator::new(
            db.clone(),
            validator,
            rate_limiter,
            queue,
            settings.request_timeout,
        ));
        let batch_coordinator = Arc::new(BatchCoordinator::new(
            Arc::clone(&ingest_coordinator),
            settings.max_batch_size,
        ));

        let query_service = Arc::new(QueryService::new(db.clone()));

        let token_service = Arc::new(TokenService::new(
            settings.secret_key.clone(),
            settings.access_token_ttl_secs,
        ));
        let auth_service = Arc::new(AuthService::new(db.clone(), token_service));

        Self {
            db,
            settings,
            tenant_registry,
            ingest_coordinator,
            batch_coordinator,
            query_service,
            auth_service,
        }
    }
}
