mod common;

use common::{seed_tenant, seed_user, setup_harness, TestHarness};
use poem::http::StatusCode;
use poem::test::TestClient;
use poem::Route;
use serde_json::json;

use pulsestream::get_routes;

async fn http_harness() -> (TestClient<Route>, TestHarness) {
    let harness = setup_harness().await;
    let client = TestClient::new(get_routes(harness.app.clone()));
    (client, harness)
}

fn event_body(event_id: &str) -> serde_json::Value {
    json!({
        "event_type": "api_call",
        "event_id": event_id,
        "title": "GET /users",
        "severity": "info",
        "source": { "service": "user-service" }
    })
}

#[tokio::test]
async fn liveness_probe_responds() {
    let (client, _harness) = http_harness().await;

    let resp = client.get("/health").send().await;
    resp.assert_status_is_ok();
    let body = resp.json().await;
    body.value().object().get("status").assert_string("healthy");
}

#[tokio::test]
async fn ingest_round_trips_over_http() {
    let (client, harness) = http_harness().await;
    seed_tenant(&harness.db, "acme", "psk_acme", 100).await;

    let resp = client
        .post("/api/v1/ingestion/events")
        .header("X-API-Key", "psk_acme")
        .content_type("application/json")
        .body(event_body("evt-1").to_string())
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = resp.json().await;
    let object = body.value().object();
    object.get("success").assert_bool(true);
    object.get("event_id").assert_string("evt-1");

    // The identical retry reports the duplicate
    let retry = client
        .post("/api/v1/ingestion/events")
        .header("X-API-Key", "psk_acme")
        .content_type("application/json")
        .body(event_body("evt-1").to_string())
        .send()
        .await;
    retry.assert_status_is_ok();
    let retry_body = retry.json().await;
    let retry_object = retry_body.value().object();
    retry_object.get("event_id").assert_string("evt-1");
    retry_object.get("duplicate").assert_bool(true);

    // And the event is retrievable by the id the client knows
    let fetch = client
        .get("/api/v1/ingestion/events/evt-1")
        .header("X-API-Key", "psk_acme")
        .send()
        .await;
    fetch.assert_status_is_ok();
}

#[tokio::test]
async fn requests_without_a_key_are_unauthorized() {
    let (client, harness) = http_harness().await;
    seed_tenant(&harness.db, "acme", "psk_acme", 100).await;

    let resp = client
        .post("/api/v1/ingestion/events")
        .content_type("application/json")
        .body(event_body("evt-1").to_string())
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_keys_get_the_error_envelope() {
    let (client, harness) = http_harness().await;
    seed_tenant(&harness.db, "acme", "psk_acme", 100).await;

    let resp = client
        .post("/api/v1/ingestion/events")
        .header("X-API-Key", "psk_nope")
        .content_type("application/json")
        .body(event_body("evt-1").to_string())
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    let body = resp.json().await;
    body.value()
        .object()
        .get("error")
        .object()
        .get("kind")
        .assert_string("unauthorized");
}

#[tokio::test]
async fn invalid_events_list_the_offending_fields() {
    let (client, harness) = http_harness().await;
    seed_tenant(&harness.db, "acme", "psk_acme", 100).await;

    let resp = client
        .post("/api/v1/ingestion/events")
        .header("X-API-Key", "psk_acme")
        .content_type("application/json")
        .body(json!({ "title": "missing everything else" }).to_string())
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let body = resp.json().await;
    let error = body.value().object().get("error").object();
    error.get("kind").assert_string("invalid_event");
    let fields = error.get("details").object().get("fields").object_array();
    assert!(!fields.is_empty());
}

#[tokio::test]
async fn over_limit_requests_get_retry_after() {
    let (client, harness) = http_harness().await;
    seed_tenant(&harness.db, "tiny", "psk_tiny", 2).await;

    for i in 0..2 {
        let ok = client
            .post("/api/v1/ingestion/events")
            .header("X-API-Key", "psk_tiny")
            .content_type("application/json")
            .body(event_body(&format!("evt-{}", i)).to_string())
            .send()
            .await;
        ok.assert_status_is_ok();
    }

    let rejected = client
        .post("/api/v1/ingestion/events")
        .header("X-API-Key", "psk_tiny")
        .content_type("application/json")
        .body(event_body("evt-3").to_string())
        .send()
        .await;
    rejected.assert_status(StatusCode::TOO_MANY_REQUESTS);

    let body = rejected.json().await;
    let error = body.value().object().get("error").object();
    error.get("kind").assert_string("rate_limited");
    let retry_after = error
        .get("details")
        .object()
        .get("retry_after_seconds")
        .i64();
    assert!(retry_after > 0 && retry_after <= 60);
}

#[tokio::test]
async fn batch_endpoint_reports_partial_success() {
    let (client, harness) = http_harness().await;
    seed_tenant(&harness.db, "acme", "psk_acme", 100).await;

    let batch = json!({
        "events": [
            event_body("evt-a"),
            { "title": "no event_type", "source": { "service": "s" } },
            event_body("evt-b")
        ]
    });
    let resp = client
        .post("/api/v1/ingestion/events/batch")
        .header("X-API-Key", "psk_acme")
        .content_type("application/json")
        .body(batch.to_string())
        .send()
        .await;
    resp.assert_status_is_ok();

    let body = resp.json().await;
    let object = body.value().object();
    object.get("successful_count").assert_i64(2);
    object.get("failed_count").assert_i64(1);
}

#[tokio::test]
async fn cross_tenant_lookups_are_not_found() {
    let (client, harness) = http_harness().await;
    seed_tenant(&harness.db, "acme", "psk_acme", 100).await;
    seed_tenant(&harness.db, "globex", "psk_globex", 100).await;

    let created = client
        .post("/api/v1/ingestion/events")
        .header("X-API-Key", "psk_globex")
        .content_type("application/json")
        .body(event_body("evt-globex").to_string())
        .send()
        .await;
    created.assert_status_is_ok();

    let resp = client
        .get("/api/v1/ingestion/events/evt-globex")
        .header("X-API-Key", "psk_acme")
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_and_stats_respond_over_http() {
    let (client, harness) = http_harness().await;
    seed_tenant(&harness.db, "acme", "psk_acme", 100).await;

    for i in 0..3 {
        client
            .post("/api/v1/ingestion/events")
            .header("X-API-Key", "psk_acme")
            .content_type("application/json")
            .body(event_body(&format!("evt-{}", i)).to_string())
            .send()
            .await
            .assert_status_is_ok();
    }

    let search = client
        .get("/api/v1/ingestion/events/search?event_type=api_call")
        .header("X-API-Key", "psk_acme")
        .send()
        .await;
    search.assert_status_is_ok();
    let search_body = search.json().await;
    search_body.value().object().get("total").assert_i64(3);

    let stats = client
        .get("/api/v1/ingestion/stats")
        .header("X-API-Key", "psk_acme")
        .send()
        .await;
    stats.assert_status_is_ok();
    let stats_body = stats.json().await;
    stats_body
        .value()
        .object()
        .get("total_events")
        .assert_i64(3);
}

#[tokio::test]
async fn login_round_trips_over_http() {
    let (client, harness) = http_harness().await;
    let tenant = seed_tenant(&harness.db, "acme", "psk_acme", 100).await;
    seed_user(&harness.db, &tenant.id, "dev@acme.example", "hunter2hunter2", "admin").await;

    let good = json!({
        "tenant": "acme",
        "email": "dev@acme.example",
        "password": "hunter2hunter2"
    });
    let resp = client
        .post("/api/v1/auth/login")
        .content_type("application/json")
        .body(good.to_string())
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = resp.json().await;
    body.value()
        .object()
        .get("token_type")
        .assert_string("Bearer");

    let bad = json!({
        "tenant": "acme",
        "email": "dev@acme.example",
        "password": "wrong"
    });
    let rejected = client
        .post("/api/v1/auth/login")
        .content_type("application/json")
        .body(bad.to_string())
        .send()
        .await;
    rejected.assert_status(StatusCode::UNAUTHORIZED);
}
