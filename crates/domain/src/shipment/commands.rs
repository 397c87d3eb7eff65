//! Shipment commands.

use common::{LabelId, Meta, ShipmentId};
use serde::Deserialize;

use super::{ContentLine, PackingLine, ShipmentError};

/// Create a new shipment.
///
/// Fields arrive unvalidated; [`Shipment::create`](super::Shipment::create)
/// checks them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateShipment {
    pub shipment_id: String,
    pub shipment_name: String,
    pub meta: Meta,
    pub shipment_contents: Vec<ContentLine>,
    pub packing_lines: Vec<PackingLine>,
    pub status: Option<String>,
    pub is_priority: bool,
    pub priority_index: Option<i64>,
    pub packing_instructions: Option<String>,
}

impl CreateShipment {
    /// Creates a command with the required fields set.
    pub fn new(
        shipment_id: impl Into<String>,
        shipment_name: impl Into<String>,
        shipment_contents: Vec<ContentLine>,
    ) -> Self {
        Self {
            shipment_id: shipment_id.into(),
            shipment_name: shipment_name.into(),
            shipment_contents,
            ..Self::default()
        }
    }

    /// Marks the shipment as priority with the given display index.
    pub fn with_priority(mut self, priority_index: i64) -> Self {
        self.is_priority = true;
        self.priority_index = Some(priority_index);
        self
    }
}

/// Replace packing lines and/or set the status.
#[derive(Debug, Clone)]
pub struct UpdatePacking {
    pub shipment_id: ShipmentId,
    pub packing_lines: Option<Vec<PackingLine>>,
    pub status: Option<String>,
}

impl UpdatePacking {
    pub fn new(
        shipment_id: impl Into<ShipmentId>,
        packing_lines: Option<Vec<PackingLine>>,
        status: Option<String>,
    ) -> Self {
        Self {
            shipment_id: shipment_id.into(),
            packing_lines,
            status,
        }
    }
}

/// New quantity for an existing content line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityUpdate {
    pub sku: String,
    pub new_quantity: u32,
}

impl QuantityUpdate {
    pub fn new(sku: impl Into<String>, new_quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            new_quantity,
        }
    }
}

/// Adjust existing content quantities and append new lines.
#[derive(Debug, Clone)]
pub struct UpdateContents {
    pub shipment_id: ShipmentId,
    pub updates: Vec<QuantityUpdate>,
    pub additions: Vec<ContentLine>,
}

impl UpdateContents {
    pub fn new(
        shipment_id: impl Into<ShipmentId>,
        updates: Vec<QuantityUpdate>,
        additions: Vec<ContentLine>,
    ) -> Self {
        Self {
            shipment_id: shipment_id.into(),
            updates,
            additions,
        }
    }
}

/// Restore a shipment to its originally submitted contents.
#[derive(Debug, Clone)]
pub struct ResetShipment {
    pub shipment_id: ShipmentId,
}

impl ResetShipment {
    pub fn new(shipment_id: impl Into<ShipmentId>) -> Self {
        Self {
            shipment_id: shipment_id.into(),
        }
    }
}

/// Set the free-text packing instructions.
#[derive(Debug, Clone)]
pub struct UpdateInstructions {
    pub shipment_id: ShipmentId,
    pub packing_instructions: String,
}

impl UpdateInstructions {
    pub fn new(shipment_id: impl Into<ShipmentId>, packing_instructions: impl Into<String>) -> Self {
        Self {
            shipment_id: shipment_id.into(),
            packing_instructions: packing_instructions.into(),
        }
    }

    /// Builds the command from an untyped payload value.
    ///
    /// Fails with a validation error unless the value is a JSON string.
    pub fn from_json(
        shipment_id: impl Into<ShipmentId>,
        value: &serde_json::Value,
    ) -> Result<Self, ShipmentError> {
        let text = value
            .as_str()
            .ok_or(ShipmentError::InstructionsNotText)?;
        Ok(Self::new(shipment_id, text))
    }
}

/// An uploaded label document awaiting storage.
#[derive(Debug, Clone)]
pub struct LabelUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Attach a shipping label to a shipment.
#[derive(Debug, Clone)]
pub struct AttachLabel {
    pub shipment_id: ShipmentId,
    pub upload: Option<LabelUpload>,
    /// JSON array of packing-line identifiers, as submitted.
    pub applies_to: Option<String>,
}

impl AttachLabel {
    pub fn new(
        shipment_id: impl Into<ShipmentId>,
        upload: Option<LabelUpload>,
        applies_to: Option<String>,
    ) -> Self {
        Self {
            shipment_id: shipment_id.into(),
            upload,
            applies_to,
        }
    }
}

/// Detach a shipping label and delete its file.
#[derive(Debug, Clone)]
pub struct RemoveLabel {
    pub shipment_id: ShipmentId,
    pub label_id: LabelId,
}

impl RemoveLabel {
    pub fn new(shipment_id: impl Into<ShipmentId>, label_id: LabelId) -> Self {
        Self {
            shipment_id: shipment_id.into(),
            label_id,
        }
    }
}
