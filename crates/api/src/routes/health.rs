//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub message: &'static str,
    /// Time the server started.
    pub time: DateTime<Utc>,
    pub storage: &'static str,
}

/// GET /api/health: returns server liveness and startup time.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: "Server is healthy",
        time: state.started_at,
        storage: state.storage_backend,
    })
}
