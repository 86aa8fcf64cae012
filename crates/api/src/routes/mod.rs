//! API routes.

pub mod dashboard;
pub mod export;
pub mod health;
pub mod ingest;
pub mod status;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload-sms", post(ingest::upload_handler))
        .route("/sms_upload", post(ingest::upload_handler))
        .route("/api/sms", get(export::export_handler))
        .route("/api/status", get(status::status_handler))
        .route("/", get(dashboard::dashboard_handler))
        .route("/sms", get(dashboard::dashboard_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
