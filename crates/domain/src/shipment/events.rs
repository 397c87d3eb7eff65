//! Shipment domain events.

use chrono::{DateTime, Utc};
use common::{LabelId, Meta, ShipmentId};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::aggregate::DomainEvent;

use super::{ContentLine, PackingLine, ShipmentStatus, ShippingLabel};

/// Events that can occur on a shipment.
///
/// Each event is both applied to the aggregate and written to the
/// shipment's history stream under its [`DomainEvent::history_name`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ShipmentEvent {
    /// Shipment was created with its initial contents.
    ShipmentCreated(ShipmentCreatedData),

    /// Packing lines and/or status were replaced.
    PackingUpdated(PackingUpdatedData),

    /// Quantity of an existing content line changed.
    QuantityUpdated(QuantityUpdatedData),

    /// A new SKU was added to the contents.
    SkuAdded(SkuAddedData),

    /// Contents restored to the original snapshot, packing discarded.
    ShipmentReset,

    /// Free-text packing instructions were set.
    InstructionsUpdated(InstructionsUpdatedData),

    /// A shipping label was attached.
    LabelAttached(LabelAttachedData),

    /// A shipping label was removed.
    LabelRemoved(LabelRemovedData),
}

impl DomainEvent for ShipmentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ShipmentEvent::ShipmentCreated(_) => "ShipmentCreated",
            ShipmentEvent::PackingUpdated(_) => "PackingUpdated",
            ShipmentEvent::QuantityUpdated(_) => "QuantityUpdated",
            ShipmentEvent::SkuAdded(_) => "SkuAdded",
            ShipmentEvent::ShipmentReset => "ShipmentReset",
            ShipmentEvent::InstructionsUpdated(_) => "InstructionsUpdated",
            ShipmentEvent::LabelAttached(_) => "LabelAttached",
            ShipmentEvent::LabelRemoved(_) => "LabelRemoved",
        }
    }

    fn history_name(&self) -> &'static str {
        match self {
            ShipmentEvent::ShipmentCreated(_) => "Shipment Created",
            ShipmentEvent::PackingUpdated(_) => "Packing Updated",
            ShipmentEvent::QuantityUpdated(_) => "Quantity Updated",
            ShipmentEvent::SkuAdded(_) => "SKU Added",
            ShipmentEvent::ShipmentReset => "Shipment Reset",
            ShipmentEvent::InstructionsUpdated(_) => "Packing Instructions Updated",
            ShipmentEvent::LabelAttached(_) => "Shipping Label Uploaded",
            ShipmentEvent::LabelRemoved(_) => "Shipping Label Removed",
        }
    }

    fn history_meta(&self) -> serde_json::Value {
        match self {
            ShipmentEvent::ShipmentCreated(data) => json!({
                "shipmentName": data.shipment_name,
                "status": data.status,
                "itemCount": data.shipment_contents.len(),
                "totalUnits": data.shipment_contents.iter().map(|l| u64::from(l.quantity)).sum::<u64>(),
            }),
            ShipmentEvent::PackingUpdated(data) => json!({
                "status": data.status,
                "packingLineCount": data.packing_line_count,
            }),
            ShipmentEvent::QuantityUpdated(data) => json!({
                "sku": data.sku,
                "oldQuantity": data.old_quantity,
                "newQuantity": data.new_quantity,
            }),
            ShipmentEvent::SkuAdded(data) => json!({
                "sku": data.line.sku,
                "asin": data.line.asin,
                "quantity": data.line.quantity,
            }),
            ShipmentEvent::ShipmentReset => json!({}),
            ShipmentEvent::InstructionsUpdated(data) => json!({
                "packingInstructions": data.packing_instructions,
            }),
            ShipmentEvent::LabelAttached(data) => json!({
                "labelId": data.label.id,
                "fileName": data.label.file_name,
                "appliesTo": data.label.applies_to,
            }),
            ShipmentEvent::LabelRemoved(data) => json!({
                "labelId": data.label_id,
                "fileName": data.file_name,
            }),
        }
    }
}

/// Data for ShipmentCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentCreatedData {
    pub shipment_id: ShipmentId,
    pub shipment_name: String,
    pub meta: Meta,
    pub shipment_contents: Vec<ContentLine>,
    pub packing_lines: Vec<PackingLine>,
    pub status: ShipmentStatus,
    pub is_priority: bool,
    pub priority_index: Option<i64>,
    pub packing_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for PackingUpdated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingUpdatedData {
    /// Replacement packing lines; `None` leaves the current ones in place.
    pub packing_lines: Option<Vec<PackingLine>>,

    /// Status after the update.
    pub status: ShipmentStatus,

    /// Number of packing lines after the update.
    pub packing_line_count: usize,
}

/// Data for QuantityUpdated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityUpdatedData {
    pub sku: String,
    pub old_quantity: u32,
    pub new_quantity: u32,
}

/// Data for SkuAdded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuAddedData {
    pub line: ContentLine,
}

/// Data for InstructionsUpdated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionsUpdatedData {
    pub packing_instructions: String,
}

/// Data for LabelAttached event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelAttachedData {
    pub label: ShippingLabel,
}

/// Data for LabelRemoved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRemovedData {
    pub label_id: LabelId,
    pub file_name: String,
    pub file_url: String,
}

// Convenience constructors
impl ShipmentEvent {
    pub fn quantity_updated(sku: impl Into<String>, old_quantity: u32, new_quantity: u32) -> Self {
        ShipmentEvent::QuantityUpdated(QuantityUpdatedData {
            sku: sku.into(),
            old_quantity,
            new_quantity,
        })
    }

    pub fn sku_added(line: ContentLine) -> Self {
        ShipmentEvent::SkuAdded(SkuAddedData { line })
    }

    pub fn instructions_updated(packing_instructions: impl Into<String>) -> Self {
        ShipmentEvent::InstructionsUpdated(InstructionsUpdatedData {
            packing_instructions: packing_instructions.into(),
        })
    }

    pub fn label_attached(label: ShippingLabel) -> Self {
        ShipmentEvent::LabelAttached(LabelAttachedData { label })
    }

    pub fn label_removed(label: &ShippingLabel) -> Self {
        ShipmentEvent::LabelRemoved(LabelRemovedData {
            label_id: label.id,
            file_name: label.file_name.clone(),
            file_url: label.file_url.clone(),
        })
    }
}
