//! Shipment value objects.

use chrono::{DateTime, Utc};
use common::LabelId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ShipmentError;

/// How many units of a product are nominally part of a shipment.
///
/// Missing fields deserialize to empty values so that validation, not the
/// decoder, reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentLine {
    pub sku: String,
    pub asin: String,
    pub quantity: u32,
}

impl ContentLine {
    /// Creates a content line, trimming the identifiers.
    pub fn new(sku: impl AsRef<str>, asin: impl AsRef<str>, quantity: u32) -> Self {
        Self {
            sku: sku.as_ref().trim().to_string(),
            asin: asin.as_ref().trim().to_string(),
            quantity,
        }
    }

    /// Returns a copy with identifiers trimmed.
    pub(crate) fn normalized(&self) -> Self {
        Self::new(&self.sku, &self.asin, self.quantity)
    }

    /// Checks required fields and the minimum quantity.
    ///
    /// `position` is 1-based and only used in error messages.
    pub(crate) fn validate(&self, position: usize) -> Result<(), ShipmentError> {
        if self.sku.trim().is_empty() || self.asin.trim().is_empty() {
            return Err(ShipmentError::MissingContentFields { position });
        }
        if self.quantity < 1 {
            return Err(ShipmentError::ContentQuantityTooLow {
                position,
                quantity: self.quantity,
            });
        }
        Ok(())
    }
}

/// Outer box measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }
}

/// Units of one SKU carried by each box of a packing line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitsPerBox {
    pub sku: String,
    pub quantity: u32,
}

impl UnitsPerBox {
    pub fn new(sku: impl AsRef<str>, quantity: u32) -> Self {
        Self {
            sku: sku.as_ref().trim().to_string(),
            quantity,
        }
    }
}

/// One physical box configuration: `box_count` identical boxes, each
/// carrying `units_per_box`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackingLine {
    /// Identifier that shipping labels refer to in `appliesTo`.
    pub id: String,
    pub box_count: u32,
    pub dimensions: Dimensions,
    pub weight: f64,
    pub units_per_box: Vec<UnitsPerBox>,
}

impl Default for PackingLine {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            box_count: 0,
            dimensions: Dimensions::default(),
            weight: 0.0,
            units_per_box: Vec::new(),
        }
    }
}

impl PackingLine {
    /// Creates a packing line with a generated identifier.
    pub fn new(
        box_count: u32,
        dimensions: Dimensions,
        weight: f64,
        units_per_box: Vec<UnitsPerBox>,
    ) -> Self {
        Self {
            box_count,
            dimensions,
            weight,
            units_per_box,
            ..Self::default()
        }
    }

    /// Units of `sku` in a single box of this line. Saturates at `u64::MAX`.
    pub fn units_of(&self, sku: &str) -> u64 {
        self.units_per_box
            .iter()
            .filter(|u| u.sku == sku)
            .fold(0u64, |acc, u| acc.saturating_add(u64::from(u.quantity)))
    }

    /// Units of `sku` across every box of this line.
    pub fn packed_units_of(&self, sku: &str) -> u64 {
        self.units_of(sku).saturating_mul(u64::from(self.box_count))
    }

    /// Schema-level checks only; no reconciliation against shipment contents.
    pub(crate) fn validate(&self, position: usize) -> Result<(), ShipmentError> {
        let invalid = |reason: &str| ShipmentError::InvalidPackingLine {
            position,
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("line id must not be empty"));
        }
        if self.box_count < 1 {
            return Err(invalid("box count must be at least 1"));
        }
        let Dimensions {
            length,
            width,
            height,
        } = self.dimensions;
        for (name, value) in [("length", length), ("width", width), ("height", height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(&format!("{name} must be a positive number")));
            }
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(invalid("weight must be a positive number"));
        }
        if self.units_per_box.iter().any(|u| u.sku.trim().is_empty()) {
            return Err(invalid("every unit entry needs a SKU"));
        }
        Ok(())
    }
}

/// An externally generated PDF label attached to a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingLabel {
    pub id: LabelId,
    pub file_name: String,
    pub file_url: String,
    /// Packing-line identifiers this label covers.
    pub applies_to: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(box_count: u32, units: &[(&str, u32)]) -> PackingLine {
        PackingLine::new(
            box_count,
            Dimensions::new(10.0, 10.0, 10.0),
            2.5,
            units.iter().map(|(s, q)| UnitsPerBox::new(s, *q)).collect(),
        )
    }

    #[test]
    fn content_line_trims_identifiers() {
        let l = ContentLine::new(" A-1 ", " B00X ", 3);
        assert_eq!(l.sku, "A-1");
        assert_eq!(l.asin, "B00X");
    }

    #[test]
    fn content_line_requires_sku_and_asin() {
        let err = ContentLine::new("", "X", 1).validate(2).unwrap_err();
        assert!(matches!(
            err,
            ShipmentError::MissingContentFields { position: 2 }
        ));
    }

    #[test]
    fn content_line_requires_positive_quantity() {
        let err = ContentLine::new("A", "X", 0).validate(1).unwrap_err();
        assert!(matches!(err, ShipmentError::ContentQuantityTooLow { .. }));
    }

    #[test]
    fn content_line_missing_fields_deserialize_to_defaults() {
        let l: ContentLine = serde_json::from_str(r#"{"sku": "A"}"#).unwrap();
        assert_eq!(l.asin, "");
        assert_eq!(l.quantity, 0);
    }

    #[test]
    fn units_of_sums_matching_entries_per_box() {
        let l = line(3, &[("A", 2), ("B", 1), ("A", 1)]);
        assert_eq!(l.units_of("A"), 3);
        assert_eq!(l.packed_units_of("A"), 9);
        assert_eq!(l.packed_units_of("C"), 0);
    }

    #[test]
    fn packing_line_without_id_gets_one() {
        let l: PackingLine = serde_json::from_str(r#"{"boxCount": 1}"#).unwrap();
        assert!(!l.id.is_empty());
    }

    #[test]
    fn packing_line_rejects_zero_boxes() {
        let err = line(0, &[("A", 1)]).validate(1).unwrap_err();
        assert!(matches!(err, ShipmentError::InvalidPackingLine { .. }));
    }

    #[test]
    fn packing_line_rejects_negative_dimensions() {
        let mut l = line(1, &[("A", 1)]);
        l.dimensions.width = -1.0;
        assert!(l.validate(1).is_err());

        let mut l = line(1, &[("A", 1)]);
        l.weight = f64::NAN;
        assert!(l.validate(1).is_err());
    }

    #[test]
    fn packing_line_accepts_zero_unit_quantity() {
        assert!(line(2, &[("A", 0)]).validate(1).is_ok());
    }
}
