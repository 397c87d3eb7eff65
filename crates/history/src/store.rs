use std::sync::Arc;

use async_trait::async_trait;
use common::ShipmentId;

use crate::{HistoryEntry, Result};

/// Core trait for shipment history storage.
///
/// Implementations must be thread-safe (Send + Sync). Each append is atomic
/// on its own; no ordering guarantee exists between concurrent appends
/// beyond their recording timestamps.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends a single entry.
    async fn append(&self, entry: HistoryEntry) -> Result<()>;

    /// Retrieves every entry for a shipment, newest first.
    ///
    /// Entries recorded with the same timestamp are returned in reverse
    /// insertion order.
    async fn list_for_shipment(&self, shipment_id: &ShipmentId) -> Result<Vec<HistoryEntry>>;
}

#[async_trait]
impl<T: HistoryStore + ?Sized> HistoryStore for Arc<T> {
    async fn append(&self, entry: HistoryEntry) -> Result<()> {
        (**self).append(entry).await
    }

    async fn list_for_shipment(&self, shipment_id: &ShipmentId) -> Result<Vec<HistoryEntry>> {
        (**self).list_for_shipment(shipment_id).await
    }
}
