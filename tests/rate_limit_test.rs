mod common;

use common::{seed_tenant, setup_harness, submission, submission_with_id, test_context};

use pulsestream::errors::IngestError;
use pulsestream::services::query_service::SearchParams;

#[tokio::test]
async fn over_limit_submissions_are_rejected_with_reset_metadata() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "tiny", "psk_tiny", 10).await;
    let ctx = test_context(&tenant.id);

    let mut accepted = 0;
    let mut rejected = 0;

    for i in 0..15 {
        match harness
            .app
            .ingest_coordinator
            .ingest(&ctx, &tenant, &submission(&format!("event {}", i)))
            .await
        {
            Ok(_) => accepted += 1,
            Err(IngestError::RateLimited {
                limit,
                retry_after_secs,
                ..
            }) => {
                rejected += 1;
                assert_eq!(limit, 10);
                assert!(retry_after_secs > 0 && retry_after_secs <= 60);
            }
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(accepted, 10);
    assert_eq!(rejected, 5);

    // Only the accepted events were stored
    let stored = harness
        .app
        .query_service
        .search(&tenant.id, &SearchParams::default())
        .await
        .unwrap();
    assert_eq!(stored.total, 10);
}

#[tokio::test]
async fn validation_failures_do_not_consume_slots() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "tiny", "psk_tiny", 2).await;
    let ctx = test_context(&tenant.id);

    // A rejected submission never reaches the limiter
    let mut invalid = submission("x");
    invalid.event_type = None;
    for _ in 0..5 {
        let err = harness
            .app
            .ingest_coordinator
            .ingest(&ctx, &tenant, &invalid)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_event");
    }

    // The full window is still available
    for i in 0..2 {
        harness
            .app
            .ingest_coordinator
            .ingest(&ctx, &tenant, &submission(&format!("valid {}", i)))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn duplicate_submissions_still_count_as_attempts() {
    let harness = setup_harness().await;
    let tenant = seed_tenant(&harness.db, "tiny", "psk_tiny", 3).await;
    let ctx = test_context(&tenant.id);
    let body = submission_with_id("evt-1", "retried");

    // First stores, the next two are idempotent hits; all three consumed
    // a slot, so the window is now exhausted.
    for _ in 0..3 {
        harness
            .app
            .ingest_coordinator
            .ingest(&ctx, &tenant, &body)
            .await
            .unwrap();
    }

    let err = harness
        .app
        .ingest_coordinator
        .ingest(&ctx, &tenant, &submission("one too many"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "rate_limited");
}
