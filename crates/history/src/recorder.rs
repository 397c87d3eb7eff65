//! Best-effort history recording.

use common::ShipmentId;

use crate::{HistoryEntry, HistoryStore};

/// Records history entries without ever failing the caller.
///
/// A storage failure is logged and counted, then swallowed, so that an
/// audit-log outage never aborts the mutation that triggered it.
#[derive(Clone)]
pub struct HistoryRecorder<H> {
    store: H,
}

impl<H: HistoryStore> HistoryRecorder<H> {
    /// Creates a recorder writing to the given store.
    pub fn new(store: H) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &H {
        &self.store
    }

    /// Appends one entry stamped with the current time.
    pub async fn record(
        &self,
        shipment_id: &ShipmentId,
        event: impl Into<String>,
        meta: serde_json::Value,
    ) {
        self.record_entry(HistoryEntry::new(shipment_id.clone(), event, meta))
            .await;
    }

    /// Appends a prepared entry.
    pub async fn record_entry(&self, entry: HistoryEntry) {
        let shipment_id = entry.shipment_id.clone();
        let event = entry.event.clone();

        match self.store.append(entry).await {
            Ok(()) => {
                metrics::counter!("history_entries_recorded_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("history_write_failures_total").increment(1);
                tracing::error!(
                    %shipment_id,
                    %event,
                    error = %e,
                    "failed to record shipment history entry"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{HistoryError, InMemoryHistoryStore};

    struct BrokenStore;

    #[async_trait]
    impl HistoryStore for BrokenStore {
        async fn append(&self, _entry: HistoryEntry) -> crate::Result<()> {
            Err(HistoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn list_for_shipment(
            &self,
            _shipment_id: &ShipmentId,
        ) -> crate::Result<Vec<HistoryEntry>> {
            Err(HistoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn record_appends_to_store() {
        let store = InMemoryHistoryStore::new();
        let recorder = HistoryRecorder::new(store.clone());
        let id = ShipmentId::from("SHP-1");

        recorder
            .record(&id, "Shipment Reset", serde_json::json!({}))
            .await;

        let entries = store.list_for_shipment(&id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "Shipment Reset");
    }

    #[tokio::test]
    async fn storage_failure_is_swallowed() {
        let recorder = HistoryRecorder::new(BrokenStore);
        recorder
            .record(
                &ShipmentId::from("SHP-1"),
                "Packing Updated",
                serde_json::json!({"status": "Packed"}),
            )
            .await;
    }
}
