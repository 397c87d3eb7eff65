//! Shipment status.

use serde::{Deserialize, Serialize};

use super::ShipmentError;

/// The status of a shipment.
///
/// ```text
/// Draft ◄──► Packed ◄──► Shipped
/// ```
///
/// Any member may be assigned from any other; only membership in the
/// enumeration is checked. `Shipped` is terminal by convention, not by
/// enforcement. `Unpacked` is accepted on input as a synonym for `Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShipmentStatus {
    /// Created, not yet packed.
    #[default]
    #[serde(alias = "Unpacked")]
    Draft,

    /// Packing recorded.
    Packed,

    /// Handed to the carrier.
    Shipped,
}

impl ShipmentStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Draft => "Draft",
            ShipmentStatus::Packed => "Packed",
            ShipmentStatus::Shipped => "Shipped",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = ShipmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Draft" | "Unpacked" => Ok(ShipmentStatus::Draft),
            "Packed" => Ok(ShipmentStatus::Packed),
            "Shipped" => Ok(ShipmentStatus::Shipped),
            other => Err(ShipmentError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_draft() {
        assert_eq!(ShipmentStatus::default(), ShipmentStatus::Draft);
    }

    #[test]
    fn test_parse_accepts_every_member_and_alias() {
        assert_eq!("Draft".parse::<ShipmentStatus>().unwrap(), ShipmentStatus::Draft);
        assert_eq!("Unpacked".parse::<ShipmentStatus>().unwrap(), ShipmentStatus::Draft);
        assert_eq!("Packed".parse::<ShipmentStatus>().unwrap(), ShipmentStatus::Packed);
        assert_eq!("Shipped".parse::<ShipmentStatus>().unwrap(), ShipmentStatus::Shipped);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "Delivered".parse::<ShipmentStatus>().unwrap_err();
        assert!(matches!(err, ShipmentError::InvalidStatus { ref value } if value == "Delivered"));
        assert!("packed".parse::<ShipmentStatus>().is_err());
    }


    #[test]
    fn test_unpacked_alias_deserializes_to_draft() {
        let status: ShipmentStatus = serde_json::from_str("\"Unpacked\"").unwrap();
        assert_eq!(status, ShipmentStatus::Draft);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Draft\"");
    }
}
