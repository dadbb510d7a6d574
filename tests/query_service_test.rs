mod common;

use std::collections::HashMap;

use chrono::{Duration, Utc};
use common::{seed_tenant, setup_harness, submission, test_context};

use pulsestream::services::query_service::SearchParams;
use pulsestream::types::dto::ingest::EventContext;

/// Seed a small mixed stream for one tenant
async fn seed_events(harness: &common::TestHarness, tenant: &pulsestream::types::db::tenant::Model) {
    let ctx = test_context(&tenant.id);

    let mut checkout_error = submission("payment declined");
    checkout_error.event_type = Some("error".to_string());
    checkout_error.severity = Some("error".to_string());

    let mut tagged = submission("deploy finished");
    tagged.event_type = Some("system".to_string());
    tagged.context = Some(EventContext {
        user_id: Some("u-42".to_string()),
        session_id: None,
        request_id: None,
        ip_address: None,
        user_agent: None,
        tags: Some(HashMap::from([(
            "region".to_string(),
            "us-east-1".to_string(),
        )])),
    });

    let mut old = submission("stale metric");
    old.timestamp = Some((Utc::now() - Duration::days(7)).to_rfc3339());

    for body in [
        submission("GET /users listed"),
        checkout_error,
        tagged,
        old,
    ] {
        harness
            .app
            .ingest_coordinator
            .ingest(&ctx, tenant, &body)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn filters_compose_conjunctively() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "acme", "psk_acme", 100).await;
    seed_events(&harness, &tenant).await;

    let by_kind = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                event_type: Some("error".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_kind.total, 1);
    assert_eq!(by_kind.events[0].title, "payment declined");

    let by_severity = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                severity: Some("info".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_severity.total, 3);

    let mismatch = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                event_type: Some("error".to_string()),
                severity: Some("info".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(mismatch.total, 0);
}

#[tokio::test]
async fn tag_equality_filter_matches_exact_pairs() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "acme", "psk_acme", 100).await;
    seed_events(&harness, &tenant).await;

    let hit = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                tag: Some("region:us-east-1".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(hit.total, 1);
    assert_eq!(hit.events[0].title, "deploy finished");
    assert_eq!(
        hit.events[0].tags.as_ref().unwrap().get("region"),
        Some(&"us-east-1".to_string())
    );

    let miss = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                tag: Some("region:eu-west-1".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(miss.total, 0);
}

#[tokio::test]
async fn free_text_matches_title_and_message() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "acme", "psk_acme", 100).await;
    let ctx = test_context(&tenant.id);

    let mut with_message = submission("background job");
    with_message.message = Some("retry budget exhausted".to_string());
    harness
        .app
        .ingest_coordinator
        .ingest(&ctx, &tenant, &with_message)
        .await
        .unwrap();
    harness
        .app
        .ingest_coordinator
        .ingest(&ctx, &tenant, &submission("budget report generated"))
        .await
        .unwrap();

    let results = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                q: Some("budget".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(results.total, 2);
}

#[tokio::test]
async fn time_window_bounds_the_results() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "acme", "psk_acme", 100).await;
    seed_events(&harness, &tenant).await;

    let recent = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                start_time: Some((Utc::now() - Duration::days(1)).to_rfc3339()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // The week-old event falls outside the window
    assert_eq!(recent.total, 3);
    assert!(recent.events.iter().all(|e| e.title != "stale metric"));
}

#[tokio::test]
async fn pagination_walks_the_stream_newest_first() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "acme", "psk_acme", 100).await;
    let ctx = test_context(&tenant.id);

    for i in 0..5 {
        let mut body = submission(&format!("event {}", i));
        body.timestamp = Some((Utc::now() - Duration::minutes(10 - i)).to_rfc3339());
        harness
            .app
            .ingest_coordinator
            .ingest(&ctx, &tenant, &body)
            .await
            .unwrap();
    }

    let first_page = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first_page.total, 5);
    assert_eq!(first_page.events.len(), 2);
    // Default sort is occurrence time descending
    assert_eq!(first_page.events[0].title, "event 4");

    let second_page = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                limit: Some(2),
                offset: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(second_page.events[0].title, "event 2");

    let ascending = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                limit: Some(2),
                sort: Some("asc".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ascending.events[0].title, "event 0");
}

#[tokio::test]
async fn stats_totals_agree_with_search() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "acme", "psk_acme", 100).await;
    seed_events(&harness, &tenant).await;

    let stats = harness
        .app
        .query_service
        .stats(&tenant.id, Some(24))
        .await
        .unwrap();
    let search = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                start_time: Some((Utc::now() - Duration::hours(24)).to_rfc3339()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(stats.window_hours, 24);
    assert_eq!(stats.total_events, search.total);
    assert_eq!(
        stats.by_event_type.values().sum::<u64>(),
        stats.total_events
    );
    assert_eq!(stats.by_severity.values().sum::<u64>(), stats.total_events);
    assert_eq!(stats.by_event_type.get("error"), Some(&1));
}

#[tokio::test]
async fn events_resolve_by_server_id_and_external_id() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "acme", "psk_acme", 100).await;
    let ctx = test_context(&tenant.id);

    let mut body = submission("lookup me");
    body.event_id = Some("evt-lookup".to_string());
    let outcome = harness
        .app
        .ingest_coordinator
        .ingest(&ctx, &tenant, &body)
        .await
        .unwrap();

    let by_server_id = harness
        .app
        .query_service
        .event_by_id(&tenant.id, &outcome.server_id)
        .await
        .unwrap();
    let by_external_id = harness
        .app
        .query_service
        .event_by_id(&tenant.id, "evt-lookup")
        .await
        .unwrap();

    assert_eq!(by_server_id.id, by_external_id.id);
    assert_eq!(by_external_id.event_id.as_deref(), Some("evt-lookup"));
}

#[tokio::test]
async fn unknown_filter_values_are_rejected() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "acme", "psk_acme", 100).await;

    let err = harness
        .app
        .query_service
        .search(
            &tenant.id,
            &SearchParams {
                event_type: Some("telemetry".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_event");
}
