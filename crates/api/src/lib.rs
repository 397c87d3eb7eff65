//! HTTP API server for the shipment management system.
//!
//! Provides REST endpoints for shipments, packing, shipping labels,
//! shipment history and the product catalog, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use domain::InMemoryLabelStorage;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Multipart framing allowance on top of the label size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Creates the Axum application router with all routes and shared state.
///
/// Files under `upload_dir` are served at `/uploads`.
pub fn create_app(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    upload_dir: impl AsRef<Path>,
    max_label_bytes: usize,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    let label_routes = Router::new()
        .route(
            "/api/shipments/{shipment_id}/labels",
            post(routes::labels::upload).get(routes::labels::list),
        )
        .route(
            "/api/shipments/{shipment_id}/labels/{label_id}",
            delete(routes::labels::remove),
        )
        .layer(DefaultBodyLimit::max(
            max_label_bytes.saturating_add(MULTIPART_OVERHEAD),
        ));

    Router::new()
        .route("/api/health", get(routes::health::check))
        .route(
            "/api/shipments",
            post(routes::shipments::create).get(routes::shipments::list),
        )
        .route("/api/shipments/{shipment_id}", get(routes::shipments::get))
        .route(
            "/api/shipments/{shipment_id}/packing",
            patch(routes::shipments::update_packing),
        )
        .route(
            "/api/shipments/{shipment_id}/contents",
            patch(routes::shipments::update_contents),
        )
        .route(
            "/api/shipments/{shipment_id}/reset",
            post(routes::shipments::reset),
        )
        .route(
            "/api/shipments/{shipment_id}/instructions",
            patch(routes::shipments::update_instructions),
        )
        .route(
            "/api/shipments/{shipment_id}/history",
            get(routes::shipments::history),
        )
        .route(
            "/api/products",
            get(routes::products::list).post(routes::products::create),
        )
        .merge(label_routes)
        .with_state(state)
        .merge(metrics_router)
        .nest_service("/uploads", ServeDir::new(upload_dir.as_ref()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates state backed by in-memory stores, including label storage.
pub fn create_in_memory_state(max_label_bytes: usize) -> Arc<AppState> {
    Arc::new(AppState::in_memory(
        Arc::new(InMemoryLabelStorage::new()),
        max_label_bytes,
    ))
}
