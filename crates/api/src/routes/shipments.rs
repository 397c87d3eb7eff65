//! Shipment lifecycle and packing endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::ShipmentId;
use domain::{
    ContentLine, CreateShipment, PackingLine, QuantityUpdate, ResetShipment, Shipment,
    UpdateContents, UpdateInstructions, UpdatePacking,
};
use history::HistoryEntry;
use serde::Deserialize;

use super::{ApiResponse, AppState};
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePackingRequest {
    pub packing_lines: Option<Vec<PackingLine>>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateContentsRequest {
    pub updates: Vec<QuantityUpdate>,
    pub additions: Vec<ContentLine>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateInstructionsRequest {
    /// Kept untyped so a non-string value is reported as a validation error.
    pub packing_instructions: serde_json::Value,
}

// -- Handlers --

/// POST /api/shipments: create a shipment.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateShipment>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Shipment>>), ApiError> {
    let Json(cmd) = payload?;
    let shipment = state.shipments.create_shipment(cmd).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(shipment))))
}

/// GET /api/shipments: list shipments in display order.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Shipment>>>, ApiError> {
    let shipments = state.shipments.list_shipments().await?;
    let count = shipments.len();
    Ok(Json(ApiResponse::counted(shipments, count)))
}

/// GET /api/shipments/{shipment_id}: load one shipment.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(shipment_id): Path<String>,
) -> Result<Json<ApiResponse<Shipment>>, ApiError> {
    let shipment = state
        .shipments
        .get_shipment(&ShipmentId::new(shipment_id))
        .await?;
    Ok(Json(ApiResponse::ok(shipment)))
}

/// PATCH /api/shipments/{shipment_id}/packing: replace packing and/or status.
#[tracing::instrument(skip(state, payload))]
pub async fn update_packing(
    State(state): State<Arc<AppState>>,
    Path(shipment_id): Path<String>,
    payload: Result<Json<UpdatePackingRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Shipment>>, ApiError> {
    let Json(req) = payload?;
    let result = state
        .shipments
        .update_packing(UpdatePacking::new(
            ShipmentId::new(shipment_id),
            req.packing_lines,
            req.status,
        ))
        .await?;
    Ok(Json(ApiResponse::ok(result.shipment)))
}

/// PATCH /api/shipments/{shipment_id}/contents: adjust quantities and add SKUs.
#[tracing::instrument(skip(state, payload))]
pub async fn update_contents(
    State(state): State<Arc<AppState>>,
    Path(shipment_id): Path<String>,
    payload: Result<Json<UpdateContentsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Shipment>>, ApiError> {
    let Json(req) = payload?;
    let result = state
        .shipments
        .update_contents(UpdateContents::new(
            ShipmentId::new(shipment_id),
            req.updates,
            req.additions,
        ))
        .await?;
    Ok(Json(ApiResponse::ok(result.shipment)))
}

/// POST /api/shipments/{shipment_id}/reset: restore the original contents.
#[tracing::instrument(skip(state))]
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(shipment_id): Path<String>,
) -> Result<Json<ApiResponse<Shipment>>, ApiError> {
    let result = state
        .shipments
        .reset_shipment(ResetShipment::new(ShipmentId::new(shipment_id)))
        .await?;
    Ok(Json(ApiResponse::ok(result.shipment)))
}

/// PATCH /api/shipments/{shipment_id}/instructions: set packing instructions.
#[tracing::instrument(skip(state, payload))]
pub async fn update_instructions(
    State(state): State<Arc<AppState>>,
    Path(shipment_id): Path<String>,
    payload: Result<Json<UpdateInstructionsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Shipment>>, ApiError> {
    let Json(req) = payload?;
    let cmd = UpdateInstructions::from_json(
        ShipmentId::new(shipment_id),
        &req.packing_instructions,
    )
    .map_err(domain::DomainError::from)?;
    let result = state.shipments.update_instructions(cmd).await?;
    Ok(Json(ApiResponse::ok(result.shipment)))
}

/// GET /api/shipments/{shipment_id}/history: history entries, newest first.
#[tracing::instrument(skip(state))]
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(shipment_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<HistoryEntry>>>, ApiError> {
    let entries = state
        .shipments
        .history(&ShipmentId::new(shipment_id))
        .await?;
    let count = entries.len();
    Ok(Json(ApiResponse::counted(entries, count)))
}
