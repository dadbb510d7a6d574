use std::sync::Arc;

use chrono::Utc;

use crate::coordinators::IngestCoordinator;
use crate::errors::api::error_body;
use crate::errors::internal::ValidationFailure;
use crate::errors::IngestError;
use crate::types::db::tenant;
use crate::types::dto::common::FieldViolation;
use crate::types::dto::ingest::{BatchIngestionResponse, BatchItemOutcome, BatchSubmission};
use crate::types::internal::RequestContext;

/// Partial-success batch processing
///
/// Each element runs through the ingestion coordinator independently; one
/// element's failure never blocks the others. The only whole-batch failures
/// are a bad envelope and the all-elements-invalid case.
pub struct BatchCoordinator {
    ingest: Arc<IngestCoordinator>,
    max_batch_size: usize,
}

impl BatchCoordinator {
    pub fn new(ingest: Arc<IngestCoordinator>, max_batch_size: usize) -> Self {
        Self {
            ingest,
            max_batch_size,
        }
    }

    pub async fn ingest_batch(
        &self,
        ctx: &RequestContext,
        tenant: &tenant::Model,
        batch: &BatchSubmission,
    ) -> Result<BatchIngestionResponse, IngestError> {
        if batch.events.is_empty() {
            return Err(ValidationFailure::single("events", "must contain at least one event").into());
        }
        if batch.events.len() > self.max_batch_size {
            return Err(ValidationFailure::single(
                "events",
                format!(
                    "batch of {} events exceeds the maximum of {}",
                    batch.events.len(),
                    self.max_batch_size
                ),
            )
            .into());
        }

        let mut results = Vec::with_capacity(batch.events.len());
        let mut successful_count: u32 = 0;
        let mut failed_count: u32 = 0;
        let mut all_failures_are_validation = true;
        let mut prefixed_violations: Vec<FieldViolation> = Vec::new();

        for (index, submission) in batch.events.iter().enumerate() {
            match self.ingest.ingest(ctx, tenant, submission).await {
                Ok(outcome) => {
                    successful_count += 1;
                    results.push(BatchItemOutcome {
                        index: index as u32,
                        success: true,
                        event_id: Some(outcome.client_event_id()),
                        duplicate: outcome.duplicate.then_some(true),
                        error: None,
                    });
                }
                Err(err) => {
                    failed_count += 1;
                    if let IngestError::Validation(failure) = &err {
                        for violation in &failure.violations {
                            prefixed_violations.push(FieldViolation {
                                path: format!("events[{}].{}", index, violation.path),
                                message: violation.message.clone(),
                            });
                        }
                    } else {
                        all_failures_are_validation = false;
                    }
                    results.push(BatchItemOutcome {
                        index: index as u32,
                        success: false,
                        event_id: None,
                        duplicate: None,
                        error: Some(error_body(&err).error),
                    });
                }
            }
        }

        // Everything failed validation: surface one 400 carrying the
        // element-prefixed field list instead of a hollow 200.
        if successful_count == 0 && all_failures_are_validation {
            return Err(ValidationFailure::new(prefixed_violations).into());
        }

        tracing::info!(
            request_id = %ctx.request_id,
            tenant_id = %tenant.id,
            successful = successful_count,
            failed = failed_count,
            "Batch processed"
        );

        Ok(BatchIngestionResponse {
            total_count: batch.events.len() as u32,
            successful_count,
            failed_count,
            ingested_at: Utc::now().to_rfc3339(),
            results,
        })
    }
}
