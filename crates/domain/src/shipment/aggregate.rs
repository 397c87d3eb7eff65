//! Shipment aggregate implementation.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use common::{LabelId, Meta, ShipmentId};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{
    ContentLine, CreateShipment, PackingLine, ShipmentError, ShipmentEvent, ShipmentStatus,
    ShippingLabel,
    events::{PackingUpdatedData, QuantityUpdatedData, ShipmentCreatedData},
};

/// Shipment aggregate root.
///
/// Tracks what should ship (`shipment_contents`), how it is physically
/// packed (`packing_lines`), and where it is in its lifecycle. The
/// `original_*` fields are the snapshot taken at creation; only creation
/// writes them, and reset reads them back into the live fields.
///
/// Serialized form is the persisted document shape (camelCase keys).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    shipment_id: ShipmentId,
    shipment_name: String,
    #[serde(default)]
    meta: Meta,
    shipment_contents: Vec<ContentLine>,
    #[serde(default)]
    packing_lines: Vec<PackingLine>,
    status: ShipmentStatus,
    #[serde(default)]
    is_priority: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority_index: Option<i64>,
    original_shipment_contents: Vec<ContentLine>,
    #[serde(default)]
    original_packing_lines: Vec<PackingLine>,
    #[serde(default)]
    shipping_labels: Vec<ShippingLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    packing_instructions: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Compare-and-swap token maintained by the repository.
    #[serde(default)]
    revision: i64,
}

impl Aggregate for Shipment {
    type Event = ShipmentEvent;
    type Error = ShipmentError;

    fn aggregate_type() -> &'static str {
        "Shipment"
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            ShipmentEvent::ShipmentCreated(data) => self.apply_created(data),
            ShipmentEvent::PackingUpdated(data) => self.apply_packing_updated(data),
            ShipmentEvent::QuantityUpdated(data) => self.apply_quantity_updated(data),
            ShipmentEvent::SkuAdded(data) => self.shipment_contents.push(data.line),
            ShipmentEvent::ShipmentReset => {
                self.shipment_contents = self.original_shipment_contents.clone();
                self.packing_lines = self.original_packing_lines.clone();
                self.status = ShipmentStatus::Draft;
            }
            ShipmentEvent::InstructionsUpdated(data) => {
                self.packing_instructions = Some(data.packing_instructions);
            }
            ShipmentEvent::LabelAttached(data) => self.shipping_labels.push(data.label),
            ShipmentEvent::LabelRemoved(data) => {
                self.shipping_labels.retain(|l| l.id != data.label_id);
            }
        }
    }
}

// Query methods
impl Shipment {
    /// Returns true once the creation event has been applied.
    pub fn is_created(&self) -> bool {
        !self.shipment_id.is_empty()
    }

    pub fn shipment_id(&self) -> &ShipmentId {
        &self.shipment_id
    }

    pub fn shipment_name(&self) -> &str {
        &self.shipment_name
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn is_priority(&self) -> bool {
        self.is_priority
    }

    pub fn priority_index(&self) -> Option<i64> {
        self.priority_index
    }

    pub fn contents(&self) -> &[ContentLine] {
        &self.shipment_contents
    }

    pub fn original_contents(&self) -> &[ContentLine] {
        &self.original_shipment_contents
    }

    pub fn packing_lines(&self) -> &[PackingLine] {
        &self.packing_lines
    }

    pub fn original_packing_lines(&self) -> &[PackingLine] {
        &self.original_packing_lines
    }

    pub fn labels(&self) -> &[ShippingLabel] {
        &self.shipping_labels
    }

    /// Returns a label by ID.
    pub fn label(&self, label_id: LabelId) -> Option<&ShippingLabel> {
        self.shipping_labels.iter().find(|l| l.id == label_id)
    }

    pub fn packing_instructions(&self) -> Option<&str> {
        self.packing_instructions.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Returns the content line for a SKU.
    pub fn content_line(&self, sku: &str) -> Option<&ContentLine> {
        self.shipment_contents.iter().find(|l| l.sku == sku)
    }

    /// Total units of `sku` committed across all packing lines.
    ///
    /// Each line contributes its per-box units multiplied by its box count.
    /// The reduction guard in [`Shipment::update_quantity`] uses this same
    /// figure.
    pub fn packed_quantity(&self, sku: &str) -> u64 {
        self.packing_lines
            .iter()
            .fold(0u64, |acc, line| acc.saturating_add(line.packed_units_of(sku)))
    }

    /// Total units across all content lines.
    pub fn total_units(&self) -> u64 {
        self.shipment_contents
            .iter()
            .map(|l| u64::from(l.quantity))
            .sum()
    }

    /// Listing order: priority shipments first, then ascending priority
    /// index (absent last), then newest first.
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        other
            .is_priority
            .cmp(&self.is_priority)
            .then_with(|| match (self.priority_index, other.priority_index) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| other.created_at.cmp(&self.created_at))
    }
}

// Command methods (return events)
impl Shipment {
    /// Validates creation input and returns the creation event.
    ///
    /// Takes the snapshot of the contents that reset later restores.
    pub fn create(&self, cmd: CreateShipment) -> Result<Vec<ShipmentEvent>, ShipmentError> {
        if self.is_created() {
            return Err(ShipmentError::AlreadyCreated);
        }

        let shipment_id = ShipmentId::new(&cmd.shipment_id);
        if shipment_id.is_empty() {
            return Err(ShipmentError::ShipmentIdRequired);
        }

        let shipment_name = cmd.shipment_name.trim();
        if shipment_name.is_empty() {
            return Err(ShipmentError::ShipmentNameRequired);
        }

        if cmd.shipment_contents.is_empty() {
            return Err(ShipmentError::NoContents);
        }

        if cmd.is_priority && cmd.priority_index.is_none() {
            return Err(ShipmentError::PriorityIndexRequired);
        }

        let status = match cmd.status.as_deref() {
            Some(raw) => raw.parse()?,
            None => ShipmentStatus::default(),
        };

        let mut seen = HashSet::new();
        let mut contents = Vec::with_capacity(cmd.shipment_contents.len());
        for (index, line) in cmd.shipment_contents.iter().enumerate() {
            line.validate(index + 1)?;
            let line = line.normalized();
            if !seen.insert(line.sku.clone()) {
                return Err(ShipmentError::DuplicateSku { sku: line.sku });
            }
            contents.push(line);
        }

        for (index, line) in cmd.packing_lines.iter().enumerate() {
            line.validate(index + 1)?;
        }

        Ok(vec![ShipmentEvent::ShipmentCreated(ShipmentCreatedData {
            shipment_id,
            shipment_name: shipment_name.to_string(),
            meta: cmd.meta,
            shipment_contents: contents,
            packing_lines: cmd.packing_lines,
            status,
            is_priority: cmd.is_priority,
            priority_index: cmd.priority_index.filter(|_| cmd.is_priority),
            packing_instructions: cmd
                .packing_instructions
                .map(|text| text.trim().to_string()),
            created_at: Utc::now(),
        })])
    }

    /// Replaces packing lines wholesale and/or assigns a status.
    ///
    /// New lines are checked for shape only; they are not reconciled against
    /// the contents. Any status in the enumeration is accepted from any
    /// current status. Always yields exactly one event.
    pub fn update_packing(
        &self,
        packing_lines: Option<Vec<PackingLine>>,
        status: Option<&str>,
    ) -> Result<Vec<ShipmentEvent>, ShipmentError> {
        self.ensure_created()?;

        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse()?,
            None => self.status,
        };

        if let Some(lines) = &packing_lines {
            for (index, line) in lines.iter().enumerate() {
                line.validate(index + 1)?;
            }
        }

        let packing_line_count = packing_lines
            .as_ref()
            .map_or(self.packing_lines.len(), Vec::len);

        Ok(vec![ShipmentEvent::PackingUpdated(PackingUpdatedData {
            packing_lines,
            status,
            packing_line_count,
        })])
    }

    /// Changes the quantity of an existing content line.
    ///
    /// A reduction below the packed quantity is rejected; reducing to
    /// exactly the packed quantity is allowed. Yields no event when the
    /// quantity is unchanged.
    pub fn update_quantity(
        &self,
        sku: &str,
        new_quantity: u32,
    ) -> Result<Vec<ShipmentEvent>, ShipmentError> {
        self.ensure_created()?;

        let sku = sku.trim();
        let line = self
            .content_line(sku)
            .ok_or_else(|| ShipmentError::SkuNotFound {
                sku: sku.to_string(),
            })?;

        if new_quantity < 1 {
            return Err(ShipmentError::InvalidQuantity {
                sku: sku.to_string(),
            });
        }

        if new_quantity < line.quantity {
            let packed = self.packed_quantity(sku);
            if u64::from(new_quantity) < packed {
                return Err(ShipmentError::BelowPackedQuantity {
                    sku: sku.to_string(),
                    requested: new_quantity,
                    packed,
                });
            }
        }

        if new_quantity == line.quantity {
            return Ok(vec![]);
        }

        Ok(vec![ShipmentEvent::quantity_updated(
            sku,
            line.quantity,
            new_quantity,
        )])
    }

    /// Appends a content line for a SKU not yet in the shipment.
    pub fn add_content_line(&self, line: ContentLine) -> Result<Vec<ShipmentEvent>, ShipmentError> {
        self.ensure_created()?;

        let line = line.normalized();
        if line.sku.is_empty() || line.asin.is_empty() || line.quantity < 1 {
            return Err(ShipmentError::InvalidAddition { sku: line.sku });
        }

        if self.content_line(&line.sku).is_some() {
            return Err(ShipmentError::SkuAlreadyExists { sku: line.sku });
        }

        Ok(vec![ShipmentEvent::sku_added(line)])
    }

    /// Restores the original contents, discards packing, returns to Draft.
    pub fn reset(&self) -> Result<Vec<ShipmentEvent>, ShipmentError> {
        self.ensure_created()?;
        Ok(vec![ShipmentEvent::ShipmentReset])
    }

    /// Sets the packing instructions, trimmed.
    pub fn update_instructions(&self, text: &str) -> Result<Vec<ShipmentEvent>, ShipmentError> {
        self.ensure_created()?;
        Ok(vec![ShipmentEvent::instructions_updated(text.trim())])
    }

    /// Attaches a stored label.
    pub fn attach_label(&self, label: ShippingLabel) -> Result<Vec<ShipmentEvent>, ShipmentError> {
        self.ensure_created()?;
        if label.applies_to.is_empty() {
            return Err(ShipmentError::InvalidAppliesTo);
        }
        Ok(vec![ShipmentEvent::label_attached(label)])
    }

    /// Detaches a label.
    pub fn remove_label(&self, label_id: LabelId) -> Result<Vec<ShipmentEvent>, ShipmentError> {
        self.ensure_created()?;
        let label = self
            .label(label_id)
            .ok_or(ShipmentError::LabelNotFound { label_id })?;
        Ok(vec![ShipmentEvent::label_removed(label)])
    }

    fn ensure_created(&self) -> Result<(), ShipmentError> {
        if self.is_created() {
            Ok(())
        } else {
            Err(ShipmentError::NotCreated)
        }
    }
}

// Persistence bookkeeping
impl Shipment {
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub(crate) fn set_revision(&mut self, revision: i64) {
        self.revision = revision;
    }
}

// Apply event helpers
impl Shipment {
    fn apply_created(&mut self, data: ShipmentCreatedData) {
        self.shipment_id = data.shipment_id;
        self.shipment_name = data.shipment_name;
        self.meta = data.meta;
        self.original_shipment_contents = data.shipment_contents.clone();
        self.shipment_contents = data.shipment_contents;
        self.original_packing_lines = Vec::new();
        self.packing_lines = data.packing_lines;
        self.status = data.status;
        self.is_priority = data.is_priority;
        self.priority_index = data.priority_index;
        self.packing_instructions = data.packing_instructions;
        self.created_at = data.created_at;
        self.updated_at = data.created_at;
        self.revision = 0;
    }

    fn apply_packing_updated(&mut self, data: PackingUpdatedData) {
        if let Some(lines) = data.packing_lines {
            self.packing_lines = lines;
        }
        self.status = data.status;
    }

    fn apply_quantity_updated(&mut self, data: QuantityUpdatedData) {
        if let Some(line) = self
            .shipment_contents
            .iter_mut()
            .find(|l| l.sku == data.sku)
        {
            line.quantity = data.new_quantity;
        }
    }
}
