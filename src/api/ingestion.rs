use std::sync::Arc;
use std::time::Duration;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{payload::Json, OpenApi, Tags};
use tokio::time::timeout;

use crate::api::{client_addr, ApiKeyAuth};
use crate::coordinators::{BatchCoordinator, IngestCoordinator};
use crate::errors::IngestError;
use crate::services::query_service::SearchParams;
use crate::services::{QueryService, TenantRegistry};
use crate::types::db::tenant;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::ingest::{
    BatchIngestApiResponse, BatchSubmission, DeleteEventApiResponse, EventIngestionResponse,
    EventSubmission, IngestEventApiResponse, RetryEventApiResponse,
};
use crate::types::dto::query::{GetEventApiResponse, SearchApiResponse, StatsApiResponse};
use crate::types::internal::RequestContext;
use crate::AppData;

/// Event ingestion and query API
pub struct IngestionApi {
    registry: Arc<TenantRegistry>,
    ingest_coordinator: Arc<IngestCoordinator>,
    batch_coordinator: Arc<BatchCoordinator>,
    query_service: Arc<QueryService>,
    request_timeout: Duration,
}

/// API tags for ingestion endpoints
#[derive(Tags)]
enum IngestionTags {
    /// Event ingestion endpoints
    Ingestion,
    /// Event query endpoints
    Query,
}

impl IngestionApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            registry: Arc::clone(&app_data.tenant_registry),
            ingest_coordinator: Arc::clone(&app_data.ingest_coordinator),
            batch_coordinator: Arc::clone(&app_data.batch_coordinator),
            query_service: Arc::clone(&app_data.query_service),
            request_timeout: app_data.settings.request_timeout,
        }
    }

    /// Resolve the tenant and build the per-request context
    async fn authenticate(
        &self,
        req: &Request,
        auth: &ApiKeyAuth,
    ) -> Result<(tenant::Model, RequestContext), IngestError> {
        let tenant = self.registry.authenticate(&auth.0.key).await?;
        let ctx = RequestContext::new(client_addr(req), &tenant.id);
        Ok((tenant, ctx))
    }
}

#[OpenApi(prefix_path = "/ingestion")]
impl IngestionApi {
    /// Ingest one event
    ///
    /// Validates, rate-limits, deduplicates and durably stores the event,
    /// then hands it off for asynchronous enrichment. Re-submitting the same
    /// event_id returns the stored event with `duplicate: true`.
    #[oai(path = "/events", method = "post", tag = "IngestionTags::Ingestion")]
    async fn ingest_event(
        &self,
        req: &Request,
        auth: ApiKeyAuth,
        body: Json<EventSubmission>,
    ) -> IngestEventApiResponse {
        let (tenant, ctx) = match self.authenticate(req, &auth).await {
            Ok(resolved) => resolved,
            Err(err) => return IngestEventApiResponse::from_error(err),
        };

        tracing::info!(
            request_id = %ctx.request_id,
            tenant_id = %tenant.id,
            "POST /ingestion/events"
        );

        // The coordinator enforces the request deadline internally so an
        // already-committed write still reports success.
        match self.ingest_coordinator.ingest(&ctx, &tenant, &body.0).await {
            Err(err) => IngestEventApiResponse::from_error(err),
            Ok(outcome) => IngestEventApiResponse::Ok(Json(EventIngestionResponse {
                success: true,
                event_id: outcome.client_event_id(),
                ingested_at: outcome.received_at.to_rfc3339(),
                duplicate: outcome.duplicate.then_some(true),
            })),
        }
    }

    /// Ingest a batch of events
    ///
    /// Elements succeed or fail independently; the response reports one
    /// outcome per element plus aggregate counts.
    #[oai(path = "/events/batch", method = "post", tag = "IngestionTags::Ingestion")]
    async fn ingest_batch(
        &self,
        req: &Request,
        auth: ApiKeyAuth,
        body: Json<BatchSubmission>,
    ) -> BatchIngestApiResponse {
        let (tenant, ctx) = match self.authenticate(req, &auth).await {
            Ok(resolved) => resolved,
            Err(err) => return BatchIngestApiResponse::from_error(err),
        };

        tracing::info!(
            request_id = %ctx.request_id,
            tenant_id = %tenant.id,
            batch_size = body.0.events.len(),
            "POST /ingestion/events/batch"
        );

        let work = self.batch_coordinator.ingest_batch(&ctx, &tenant, &body.0);
        match timeout(self.request_timeout, work).await {
            Err(_) => BatchIngestApiResponse::from_error(IngestError::Timeout),
            Ok(Err(err)) => BatchIngestApiResponse::from_error(err),
            Ok(Ok(response)) => BatchIngestApiResponse::Ok(Json(response)),
        }
    }

    /// Search stored events
    ///
    /// All predicates are optional and combined conjunctively; results are
    /// ordered by occurrence time, newest first by default.
    #[oai(path = "/events/search", method = "get", tag = "IngestionTags::Query")]
    #[allow(clippy::too_many_arguments)]
    async fn search_events(
        &self,
        req: &Request,
        auth: ApiKeyAuth,
        event_type: Query<Option<String>>,
        severity: Query<Option<String>>,
        service: Query<Option<String>>,
        endpoint: Query<Option<String>>,
        status_code: Query<Option<i32>>,
        user_id: Query<Option<String>>,
        event_id: Query<Option<String>>,
        tag: Query<Option<String>>,
        start_time: Query<Option<String>>,
        end_time: Query<Option<String>>,
        q: Query<Option<String>>,
        limit: Query<Option<u64>>,
        offset: Query<Option<u64>>,
        sort: Query<Option<String>>,
    ) -> SearchApiResponse {
        let (tenant, ctx) = match self.authenticate(req, &auth).await {
            Ok(resolved) => resolved,
            Err(err) => return SearchApiResponse::from_error(err),
        };

        tracing::debug!(
            request_id = %ctx.request_id,
            tenant_id = %tenant.id,
            "GET /ingestion/events/search"
        );

        let params = SearchParams {
            event_type: event_type.0,
            severity: severity.0,
            service: service.0,
            endpoint: endpoint.0,
            status_code: status_code.0,
            user_id: user_id.0,
            event_id: event_id.0,
            tag: tag.0,
            start_time: start_time.0,
            end_time: end_time.0,
            q: q.0,
            limit: limit.0,
            offset: offset.0,
            sort: sort.0,
        };

        match self.query_service.search(&tenant.id, &params).await {
            Ok(response) => SearchApiResponse::Ok(Json(response)),
            Err(err) => SearchApiResponse::from_error(err),
        }
    }

    /// Fetch one event by id
    ///
    /// Accepts either the server-assigned id or a client-supplied event id.
    #[oai(path = "/events/:id", method = "get", tag = "IngestionTags::Query")]
    async fn get_event(
        &self,
        req: &Request,
        auth: ApiKeyAuth,
        id: Path<String>,
    ) -> GetEventApiResponse {
        let (tenant, _ctx) = match self.authenticate(req, &auth).await {
            Ok(resolved) => resolved,
            Err(err) => return GetEventApiResponse::from_error(err),
        };

        match self.query_service.event_by_id(&tenant.id, &id.0).await {
            Ok(record) => GetEventApiResponse::Ok(Json(record)),
            Err(err) => GetEventApiResponse::from_error(err),
        }
    }

    /// Archive one event
    ///
    /// Soft-deletes the event: it disappears from all query results and its
    /// event id becomes available for a fresh submission.
    #[oai(path = "/events/:id", method = "delete", tag = "IngestionTags::Ingestion")]
    async fn delete_event(
        &self,
        req: &Request,
        auth: ApiKeyAuth,
        id: Path<String>,
    ) -> DeleteEventApiResponse {
        let (tenant, ctx) = match self.authenticate(req, &auth).await {
            Ok(resolved) => resolved,
            Err(err) => return DeleteEventApiResponse::from_error(err),
        };

        match self
            .ingest_coordinator
            .delete_event(&ctx, &tenant, &id.0)
            .await
        {
            Ok(()) => DeleteEventApiResponse::Ok(Json(MessageResponse {
                message: "Event deleted successfully".to_string(),
            })),
            Err(err) => DeleteEventApiResponse::from_error(err),
        }
    }

    /// Re-queue one event for downstream processing
    #[oai(path = "/events/:id/retry", method = "post", tag = "IngestionTags::Ingestion")]
    async fn retry_event(
        &self,
        req: &Request,
        auth: ApiKeyAuth,
        id: Path<String>,
    ) -> RetryEventApiResponse {
        let (tenant, ctx) = match self.authenticate(req, &auth).await {
            Ok(resolved) => resolved,
            Err(err) => return RetryEventApiResponse::from_error(err),
        };

        match self
            .ingest_coordinator
            .retry_event(&ctx, &tenant, &id.0)
            .await
        {
            Ok(()) => RetryEventApiResponse::Ok(Json(MessageResponse {
                message: "Event queued for reprocessing".to_string(),
            })),
            Err(err) => RetryEventApiResponse::from_error(err),
        }
    }

    /// Aggregate counts over a time window (default: last 24 hours)
    #[oai(path = "/stats", method = "get", tag = "IngestionTags::Query")]
    async fn stats(
        &self,
        req: &Request,
        auth: ApiKeyAuth,
        window_hours: Query<Option<u32>>,
    ) -> StatsApiResponse {
        let (tenant, _ctx) = match self.authenticate(req, &auth).await {
            Ok(resolved) => resolved,
            Err(err) => return StatsApiResponse::from_error(err),
        };

        match self.query_service.stats(&tenant.id, window_hours.0).await {
            Ok(response) => StatsApiResponse::Ok(Json(response)),
            Err(err) => StatsApiResponse::from_error(err),
        }
    }
}
