use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form annotations attached to shipments and history entries.
///
/// Contents are not statically typed; they are carried as JSON and
/// serialized at the storage and HTTP boundaries.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// Externally assigned shipment identifier.
///
/// Unique across all shipments and immutable once a shipment is created.
/// `ShipmentId::new` trims surrounding whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentId(String);

impl ShipmentId {
    /// Creates a shipment ID from raw input, trimming whitespace.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty after trimming.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShipmentId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ShipmentId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl AsRef<str> for ShipmentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique token identifying a shipping label attached to a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(Uuid);

impl LabelId {
    /// Creates a new random label ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a label ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a label ID from its hyphenated string form.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LabelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LabelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for LabelId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
