use chrono::{DateTime, Utc};
use common::ShipmentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Creates a new random entry ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an entry ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One record of something that happened to a shipment.
///
/// Entries are append-only: once stored they are never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique identifier for this entry.
    pub id: EntryId,

    /// The shipment this entry belongs to.
    pub shipment_id: ShipmentId,

    /// Human-readable event name (e.g., "Packing Updated").
    pub event: String,

    /// Structured payload describing the event.
    pub meta: serde_json::Value,

    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(
        shipment_id: ShipmentId,
        event: impl Into<String>,
        meta: serde_json::Value,
    ) -> Self {
        Self {
            id: EntryId::new(),
            shipment_id,
            event: event.into(),
            meta,
            created_at: Utc::now(),
        }
    }

    /// Creates an entry with an empty object payload.
    pub fn without_meta(shipment_id: ShipmentId, event: impl Into<String>) -> Self {
        Self::new(shipment_id, event, serde_json::Value::Object(Default::default()))
    }

    /// Overrides the recording timestamp.
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_new_creates_unique_ids() {
        assert_ne!(EntryId::new(), EntryId::new());
    }

    #[test]
    fn without_meta_uses_empty_object() {
        let entry = HistoryEntry::without_meta(ShipmentId::from("SHP-1"), "Shipment Reset");
        assert_eq!(entry.meta, serde_json::json!({}));
        assert_eq!(entry.event, "Shipment Reset");
    }

    #[test]
    fn entry_serializes_with_camel_case_keys() {
        let entry = HistoryEntry::new(
            ShipmentId::from("SHP-1"),
            "Quantity Updated",
            serde_json::json!({"sku": "A", "oldQuantity": 10, "newQuantity": 5}),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["shipmentId"], "SHP-1");
        assert_eq!(json["meta"]["oldQuantity"], 10);
        assert!(json.get("createdAt").is_some());
    }
}
