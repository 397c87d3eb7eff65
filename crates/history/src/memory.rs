use std::sync::Arc;

use async_trait::async_trait;
use common::ShipmentId;
use tokio::sync::RwLock;

use crate::{HistoryEntry, HistoryStore, Result};

/// In-memory history store for tests and database-less runs.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStore {
    entries: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl InMemoryHistoryStore {
    /// Creates a new empty in-memory history store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of entries stored across all shipments.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, entry: HistoryEntry) -> Result<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn list_for_shipment(&self, shipment_id: &ShipmentId) -> Result<Vec<HistoryEntry>> {
        let store = self.entries.read().await;
        // Reverse first so the stable sort keeps later inserts ahead on ties.
        let mut entries: Vec<_> = store
            .iter()
            .rev()
            .filter(|e| &e.shipment_id == shipment_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[tokio::test]
    async fn append_single_entry() {
        let store = InMemoryHistoryStore::new();
        let id = ShipmentId::from("SHP-1");

        store
            .append(HistoryEntry::without_meta(id.clone(), "Shipment Created"))
            .await
            .unwrap();

        let entries = store.list_for_shipment(&id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "Shipment Created");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryHistoryStore::new();
        let id = ShipmentId::from("SHP-1");
        let now = Utc::now();

        store
            .append(HistoryEntry::without_meta(id.clone(), "Older").at(now - Duration::seconds(5)))
            .await
            .unwrap();
        store
            .append(HistoryEntry::without_meta(id.clone(), "Newer").at(now))
            .await
            .unwrap();
        store
            .append(HistoryEntry::without_meta(id.clone(), "Oldest").at(now - Duration::seconds(60)))
            .await
            .unwrap();

        let events: Vec<_> = store
            .list_for_shipment(&id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert_eq!(events, vec!["Newer", "Older", "Oldest"]);
    }

    #[tokio::test]
    async fn equal_timestamps_list_latest_insert_first() {
        let store = InMemoryHistoryStore::new();
        let id = ShipmentId::from("SHP-1");
        let now = Utc::now();

        for name in ["first", "second", "third"] {
            store
                .append(HistoryEntry::without_meta(id.clone(), name).at(now))
                .await
                .unwrap();
        }

        let events: Vec<_> = store
            .list_for_shipment(&id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert_eq!(events, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn streams_are_isolated_per_shipment() {
        let store = InMemoryHistoryStore::new();
        let a = ShipmentId::from("SHP-A");
        let b = ShipmentId::from("SHP-B");

        store
            .append(HistoryEntry::without_meta(a.clone(), "A1"))
            .await
            .unwrap();
        store
            .append(HistoryEntry::without_meta(b.clone(), "B1"))
            .await
            .unwrap();
        store
            .append(HistoryEntry::without_meta(a.clone(), "A2"))
            .await
            .unwrap();

        assert_eq!(store.list_for_shipment(&a).await.unwrap().len(), 2);
        assert_eq!(store.list_for_shipment(&b).await.unwrap().len(), 1);
        assert!(
            store
                .list_for_shipment(&ShipmentId::from("SHP-C"))
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(store.entry_count().await, 3);
    }
}
