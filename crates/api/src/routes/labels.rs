//! Shipping label upload endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use common::{LabelId, ShipmentId};
use domain::{AttachLabel, LabelUpload, RemoveLabel, Shipment, ShippingLabel};

use super::{ApiResponse, AppState};
use crate::error::ApiError;

/// Form field carrying the PDF document.
const FILE_FIELD: &str = "file";
/// Form field carrying the JSON array of packing-line IDs.
const APPLIES_TO_FIELD: &str = "appliesTo";

/// POST /api/shipments/{shipment_id}/labels: upload and attach a label.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Path(shipment_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Shipment>>), ApiError> {
    let mut upload = None;
    let mut applies_to = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some(FILE_FIELD) => {
                let file_name = field.file_name().unwrap_or("label.pdf").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                upload = Some(LabelUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some(APPLIES_TO_FIELD) => applies_to = Some(field.text().await?),
            _ => {}
        }
    }

    let shipment = state
        .labels
        .attach_label(AttachLabel::new(
            ShipmentId::new(shipment_id),
            upload,
            applies_to,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(shipment))))
}

/// GET /api/shipments/{shipment_id}/labels: labels of a shipment.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(shipment_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ShippingLabel>>>, ApiError> {
    let labels = state
        .labels
        .list_labels(&ShipmentId::new(shipment_id))
        .await?;
    let count = labels.len();
    Ok(Json(ApiResponse::counted(labels, count)))
}

/// DELETE /api/shipments/{shipment_id}/labels/{label_id}: detach a label.
#[tracing::instrument(skip(state))]
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path((shipment_id, label_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Shipment>>, ApiError> {
    let label_id = LabelId::parse(&label_id)
        .ok_or_else(|| ApiError::NotFound(format!("Label not found: {label_id}")))?;

    let shipment = state
        .labels
        .remove_label(RemoveLabel::new(ShipmentId::new(shipment_id), label_id))
        .await?;

    Ok(Json(ApiResponse::ok(shipment)))
}
