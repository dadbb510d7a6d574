use poem_openapi::payload::Json;

use crate::errors::api::error_body;
use crate::errors::IngestError;
use crate::types::dto::auth::LoginApiResponse;
use crate::types::dto::ingest::{
    BatchIngestApiResponse, DeleteEventApiResponse, IngestEventApiResponse, RetryEventApiResponse,
};
use crate::types::dto::query::{GetEventApiResponse, SearchApiResponse, StatsApiResponse};

impl IngestEventApiResponse {
    pub fn from_error(err: IngestError) -> Self {
        let body = Json(error_body(&err));
        match err.kind() {
            "invalid_event" => IngestEventApiResponse::BadRequest(body),
            "unauthorized" => IngestEventApiResponse::Unauthorized(body),
            "rate_limited" => IngestEventApiResponse::RateLimited(body),
            "store_unavailable" | "cache_unavailable" => IngestEventApiResponse::Unavailable(body),
            "timeout" => IngestEventApiResponse::Timeout(body),
            _ => IngestEventApiResponse::Internal(body),
        }
    }
}

impl BatchIngestApiResponse {
    pub fn from_error(err: IngestError) -> Self {
        let body = Json(error_body(&err));
        match err.kind() {
            "invalid_event" => BatchIngestApiResponse::BadRequest(body),
            "unauthorized" => BatchIngestApiResponse::Unauthorized(body),
            "store_unavailable" | "cache_unavailable" => BatchIngestApiResponse::Unavailable(body),
            "timeout" => BatchIngestApiResponse::Timeout(body),
            _ => BatchIngestApiResponse::Internal(body),
        }
    }
}

impl DeleteEventApiResponse {
    pub fn from_error(err: IngestError) -> Self {
        let body = Json(error_body(&err));
        match err.kind() {
            "unauthorized" => DeleteEventApiResponse::Unauthorized(body),
            "not_found" => DeleteEventApiResponse::NotFound(body),
            "store_unavailable" => DeleteEventApiResponse::Unavailable(body),
            _ => DeleteEventApiResponse::Internal(body),
        }
    }
}

impl RetryEventApiResponse {
    pub fn from_error(err: IngestError) -> Self {
        let body = Json(error_body(&err));
        match err.kind() {
            "unauthorized" => RetryEventApiResponse::Unauthorized(body),
            "not_found" => RetryEventApiResponse::NotFound(body),
            "store_unavailable" | "cache_unavailable" => RetryEventApiResponse::Unavailable(body),
            _ => RetryEventApiResponse::Internal(body),
        }
    }
}

impl SearchApiResponse {
    pub fn from_error(err: IngestError) -> Self {
        let body = Json(error_body(&err));
        match err.kind() {
            "invalid_event" => SearchApiResponse::BadRequest(body),
            "unauthorized" => SearchApiResponse::Unauthorized(body),
            "store_unavailable" => SearchApiResponse::Unavailable(body),
            _ => SearchApiResponse::Internal(body),
        }
    }
}

impl GetEventApiResponse {
    pub fn from_error(err: IngestError) -> Self {
        let body = Json(error_body(&err));
        match err.kind() {
            "unauthorized" => GetEventApiResponse::Unauthorized(body),
            "not_found" => GetEventApiResponse::NotFound(body),
            "store_unavailable" => GetEventApiResponse::Unavailable(body),
            _ => GetEventApiResponse::Internal(body),
        }
    }
}

impl StatsApiResponse {
    pub fn from_error(err: IngestError) -> Self {
        let body = Json(error_body(&err));
        match err.kind() {
            "unauthorized" => StatsApiResponse::Unauthorized(body),
            "store_unavailable" => StatsApiResponse::Unavailable(body),
            _ => StatsApiResponse::Internal(body),
        }
    }
}

impl LoginApiResponse {
    pub fn from_error(err: IngestError) -> Self {
        let body = Json(error_body(&err));
        match err.kind() {
            "unauthorized" => LoginApiResponse::Unauthorized(body),
            _ => LoginApiResponse::Internal(body),
        }
    }
}
