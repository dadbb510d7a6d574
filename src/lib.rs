pub mod api;
pub mod app_data;
pub mod cache;
pub mod config;
pub mod coordinators;
pub mod errors;
pub mod services;
pub mod stores;
pub mod types;

pub use app_data::AppData;

use std::sync::Arc;

use poem::{get, Route};
use poem_openapi::OpenApiService;

use crate::api::{AuthApi, HealthApi, IngestionApi};

/// Compose the full route table: versioned API, swagger UI, and the
/// root-level liveness probe.
pub fn get_routes(app_data: Arc<AppData>) -> Route {
    let api_service = OpenApiService::new(
        (
            IngestionApi::new(Arc::clone(&app_data)),
            AuthApi::new(Arc::clone(&app_data)),
            HealthApi,
        ),
        "PulseStream",
        env!("CARGO_PKG_VERSION"),
    )
    .server("/api/v1");

    let swagger_ui = api_service.swagger_ui();

    Route::new()
        .at("/health", get(api::health::liveness))
        .nest("/api/v1", api_service)
        .nest("/swagger", swagger_ui)
}
