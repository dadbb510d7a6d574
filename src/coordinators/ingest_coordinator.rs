use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tokio::time::timeout;
use uuid::Uuid;

use crate::cache::EventQueue;
use crate::errors::IngestError;
use crate::services::{EventValidator, RateLimiter};
use crate::stores::EventStore;
use crate::types::db::{event, tenant};
use crate::types::dto::ingest::EventSubmission;
use crate::types::internal::RequestContext;

/// Result of one accepted ingestion
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Server-assigned row id
    pub server_id: String,
    pub external_id: Option<String>,
    pub received_at: DateTime<Utc>,
    /// True when the submission matched an already-stored event
    pub duplicate: bool,
}

impl IngestOutcome {
    /// Identifier echoed back to the client: the external id when one was
    /// submitted, the server id otherwise.
    pub fn client_event_id(&self) -> String {
        self.external_id
            .clone()
            .unwrap_or_else(|| self.server_id.clone())
    }

    fn pre_existing(row: event::Model) -> Self {
        Self {
            server_id: row.id,
            external_id: row.external_id,
            received_at: row.received_at,
            duplicate: true,
        }
    }
}

/// Orchestrates the synchronous write path for one event:
/// validate -> rate-limit -> dedup -> persist -> hand off.
///
/// The store transaction covers only the insert; the unique index on
/// (tenant_id, external_id) is what makes the dedup race-safe, and the
/// recovery path below turns a lost race into the same idempotent success
/// the early dedup check produces.
pub struct IngestCoordinator {
    db: DatabaseConnection,
    validator: EventValidator,
    rate_limiter: Arc<RateLimiter>,
    event_store: EventStore,
    queue: Arc<dyn EventQueue>,
    request_timeout: Duration,
}

/// What the timed section of the write path produced
enum Persisted {
    Fresh(event::Model),
    Duplicate(event::Model),
}

impl IngestCoordinator {
    pub fn new(
        db: DatabaseConnection,
        validator: EventValidator,
        rate_limiter: Arc<RateLimiter>,
        queue: Arc<dyn EventQueue>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            db,
            validator,
            rate_limiter,
            event_store: EventStore::new(),
            queue,
            request_timeout,
        }
    }

    /// The deadline covers everything up to and including the commit. Once
    /// the row is durable, the enqueue runs outside the deadline: a write
    /// that committed must report success even if the hand-off is abandoned.
    pub async fn ingest(
        &self,
        ctx: &RequestContext,
        tenant: &tenant::Model,
        submission: &EventSubmission,
    ) -> Result<IngestOutcome, IngestError> {
        let persisted = match timeout(
            self.request_timeout,
            self.persist(ctx, tenant, submission),
        )
        .await
        {
            // The dropped future released its transaction, rolling back any
            // uncommitted insert.
            Err(_) => {
                tracing::warn!(
                    request_id = %ctx.request_id,
                    tenant_id = %tenant.id,
                    "Request deadline expired before commit"
                );
                return Err(IngestError::Timeout);
            }
            Ok(result) => result?,
        };

        match persisted {
            Persisted::Duplicate(row) => Ok(IngestOutcome::pre_existing(row)),
            Persisted::Fresh(row) => {
                // Best-effort hand-off after commit. The row is durable; the
                // sweeper re-queues anything that never made it here.
                if let Err(err) = self.queue.enqueue(&tenant.id, &row.id).await {
                    tracing::warn!(
                        request_id = %ctx.request_id,
                        tenant_id = %tenant.id,
                        event_id = %row.id,
                        error = %err,
                        "Post-ingest enqueue failed, leaving row for the sweeper"
                    );
                }

                Ok(IngestOutcome {
                    server_id: row.id,
                    external_id: row.external_id,
                    received_at: row.received_at,
                    duplicate: false,
                })
            }
        }
    }

    async fn persist(
        &self,
        ctx: &RequestContext,
        tenant: &tenant::Model,
        submission: &EventSubmission,
    ) -> Result<Persisted, IngestError> {
        let received_at = Utc::now();

        // 1. Validate
        let validated = self.validator.validate(submission, received_at)?;

        // 2. Rate-limit with the tenant's own configured limit. A duplicate
        // submission past this point still counted as an attempt.
        let decision = self
            .rate_limiter
            .check_and_increment(&tenant.id, tenant.rate_limit_per_minute.max(1) as u64)
            .await?;
        if !decision.allowed {
            tracing::debug!(
                request_id = %ctx.request_id,
                tenant_id = %tenant.id,
                current = decision.current,
                "Rate limit exceeded"
            );
            return Err(IngestError::RateLimited {
                limit: decision.limit,
                current: decision.current,
                retry_after_secs: decision.reset_after_secs,
            });
        }

        // 3. Dedup on the client-supplied id
        if let Some(external_id) = &validated.external_id {
            if let Some(prior) = self
                .event_store
                .find_by_external_id(&self.db, &tenant.id, external_id)
                .await?
            {
                tracing::debug!(
                    request_id = %ctx.request_id,
                    tenant_id = %tenant.id,
                    event_id = %prior.id,
                    "Duplicate submission, returning stored event"
                );
                return Ok(Persisted::Duplicate(prior));
            }
        }

        // 4. Persist in one transaction
        let server_id = Uuid::new_v4().to_string();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| IngestError::database("begin_ingest", e))?;

        let inserted = self
            .event_store
            .insert(&txn, &tenant.id, &server_id, received_at, &validated)
            .await;

        match inserted {
            Ok(row) => {
                txn.commit()
                    .await
                    .map_err(|e| IngestError::database("commit_ingest", e))?;

                Ok(Persisted::Fresh(row))
            }
            Err(db_err) if db_err.is_unique_violation() => {
                // Late-arriving duplicate: another request won the insert
                // between the dedup read and ours. Abort and report the
                // winner's row.
                let _ = txn.rollback().await;
                self.recover_duplicate(ctx, tenant, validated.external_id.as_deref())
                    .await
            }
            Err(db_err) => {
                let _ = txn.rollback().await;
                Err(IngestError::Database(db_err))
            }
        }
    }

    /// Archive one event (soft delete). The row stays in the store but
    /// disappears from every read path, and its external id becomes
    /// available again.
    pub async fn delete_event(
        &self,
        ctx: &RequestContext,
        tenant: &tenant::Model,
        id: &str,
    ) -> Result<(), IngestError> {
        let row = self.resolve(tenant, id).await?;

        let archived = self
            .event_store
            .mark_deleted(&self.db, &tenant.id, &row.id)
            .await?;
        if !archived {
            return Err(IngestError::NotFound);
        }

        tracing::info!(
            request_id = %ctx.request_id,
            tenant_id = %tenant.id,
            event_id = %row.id,
            "Event archived"
        );

        Ok(())
    }

    /// Re-queue one stored event for downstream processing. Unlike the
    /// post-commit hand-off this is client-initiated, so a queue failure is
    /// reported instead of swallowed.
    pub async fn retry_event(
        &self,
        ctx: &RequestContext,
        tenant: &tenant::Model,
        id: &str,
    ) -> Result<(), IngestError> {
        let row = self.resolve(tenant, id).await?;

        self.queue
            .enqueue(&tenant.id, &row.id)
            .await
            .map_err(IngestError::Cache)?;

        tracing::info!(
            request_id = %ctx.request_id,
            tenant_id = %tenant.id,
            event_id = %row.id,
            "Event re-queued for processing"
        );

        Ok(())
    }

    /// Resolve an identifier as a server id first, then as an external id
    async fn resolve(
        &self,
        tenant: &tenant::Model,
        id: &str,
    ) -> Result<event::Model, IngestError> {
        if let Some(row) = self.event_store.find_by_id(&self.db, &tenant.id, id).await? {
            return Ok(row);
        }
        if let Some(row) = self
            .event_store
            .find_by_external_id(&self.db, &tenant.id, id)
            .await?
        {
            return Ok(row);
        }
        Err(IngestError::NotFound)
    }

    async fn recover_duplicate(
        &self,
        ctx: &RequestContext,
        tenant: &tenant::Model,
        external_id: Option<&str>,
    ) -> Result<Persisted, IngestError> {
        // A unique violation without an external id means something other
        // than the idempotency index fired; that is a real conflict.
        let external_id = external_id.ok_or(IngestError::Conflict {
            operation: "insert_event".to_string(),
        })?;

        let prior = self
            .event_store
            .find_by_external_id(&self.db, &tenant.id, external_id)
            .await?
            .ok_or(IngestError::Conflict {
                operation: "insert_event".to_string(),
            })?;

        tracing::debug!(
            request_id = %ctx.request_id,
            tenant_id = %tenant.id,
            event_id = %prior.id,
            "Lost insert race, returning stored event"
        );

        Ok(Persisted::Duplicate(prior))
    }
}
