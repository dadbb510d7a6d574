// Fixtures shared across the integration suites: an in-memory database,
// the fully wired application over the in-memory cache seams, and seed rows.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

use pulsestream::cache::{InMemoryEventQueue, InMemoryWindowCounter};
use pulsestream::config::ApplicationSettings;
use pulsestream::services::auth_service::hash_password;
use pulsestream::types::db::{tenant, user};
use pulsestream::types::dto::ingest::{EventSource, EventSubmission};
use pulsestream::types::internal::RequestContext;
use pulsestream::AppData;

/// Creates a test database with migrations applied
///
/// The pool is pinned to one connection: every pooled connection to
/// `sqlite::memory:` would otherwise get its own empty database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Full application wiring over an in-memory database, counter and queue
pub struct TestHarness {
    pub db: DatabaseConnection,
    pub app: Arc<AppData>,
    pub counter: Arc<InMemoryWindowCounter>,
    pub queue: Arc<InMemoryEventQueue>,
}

pub async fn setup_harness() -> TestHarness {
    setup_harness_with_settings(ApplicationSettings::default()).await
}

pub async fn setup_harness_with_settings(settings: ApplicationSettings) -> TestHarness {
    let db = setup_test_db().await;
    let counter = Arc::new(InMemoryWindowCounter::new());
    let queue = Arc::new(InMemoryEventQueue::new());

    let app = Arc::new(AppData::with_parts(
        db.clone(),
        settings,
        counter.clone(),
        queue.clone(),
    ));

    TestHarness {
        db,
        app,
        counter,
        queue,
    }
}

/// Insert an active tenant with the given credential and per-minute limit
pub async fn seed_tenant(
    db: &DatabaseConnection,
    slug: &str,
    api_key: &str,
    rate_limit_per_minute: i32,
) -> tenant::Model {
    let now = Utc::now().timestamp();

    tenant::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(format!("{} Inc", slug)),
        slug: Set(slug.to_string()),
        contact_email: Set(Some(format!("ops@{}.example", slug))),
        api_key: Set(api_key.to_string()),
        is_active: Set(true),
        rate_limit_per_minute: Set(rate_limit_per_minute),
        max_events_per_month: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed tenant")
}

/// Insert an active user with the given password, hashed for real
pub async fn seed_user(
    db: &DatabaseConnection,
    tenant_id: &str,
    email: &str,
    password: &str,
    role: &str,
) -> user::Model {
    let now = Utc::now().timestamp();

    user::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        tenant_id: Set(tenant_id.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password).expect("Failed to hash password")),
        role: Set(role.to_string()),
        is_active: Set(true),
        failed_login_attempts: Set(0),
        locked_until: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed user")
}

pub fn test_context(tenant_id: &str) -> RequestContext {
    RequestContext::new(None, tenant_id)
}

/// Minimal valid api_call submission
pub fn submission(title: &str) -> EventSubmission {
    EventSubmission {
        event_type: Some("api_call".to_string()),
        event_id: None,
        timestamp: None,
        title: Some(title.to_string()),
        message: None,
        severity: Some("info".to_string()),
        source: Some(EventSource {
            service: Some("checkout".to_string()),
            endpoint: Some("/api/orders".to_string()),
            method: Some("POST".to_string()),
            version: None,
            environment: Some("test".to_string()),
        }),
        context: None,
        metrics: None,
        payload: None,
    }
}

/// Minimal valid submission carrying a client-supplied event id
pub fn submission_with_id(external_id: &str, title: &str) -> EventSubmission {
    EventSubmission {
        event_id: Some(external_id.to_string()),
        ..submission(title)
    }
}
