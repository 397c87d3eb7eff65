//! Shipment document storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::ShipmentId;
use tokio::sync::RwLock;

use crate::error::StorageError;

use super::Shipment;

/// Storage for shipment documents.
///
/// Updates are compare-and-swap on [`Shipment::revision`]: an update only
/// lands if the stored revision still equals the one that was loaded, and
/// the stored copy then carries the next revision.
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    /// Stores a newly created shipment.
    ///
    /// Fails with [`StorageError::DuplicateKey`] if the ID is taken.
    async fn insert(&self, shipment: Shipment) -> Result<Shipment, StorageError>;

    /// Looks up a shipment by ID.
    async fn find(&self, shipment_id: &ShipmentId) -> Result<Option<Shipment>, StorageError>;

    /// Replaces a stored shipment, returning it with its new revision.
    async fn update(&self, shipment: Shipment) -> Result<Shipment, StorageError>;

    /// Returns every shipment in listing order.
    async fn list(&self) -> Result<Vec<Shipment>, StorageError>;
}

#[async_trait]
impl<T: ShipmentRepository + ?Sized> ShipmentRepository for Arc<T> {
    async fn insert(&self, shipment: Shipment) -> Result<Shipment, StorageError> {
        (**self).insert(shipment).await
    }

    async fn find(&self, shipment_id: &ShipmentId) -> Result<Option<Shipment>, StorageError> {
        (**self).find(shipment_id).await
    }

    async fn update(&self, shipment: Shipment) -> Result<Shipment, StorageError> {
        (**self).update(shipment).await
    }

    async fn list(&self) -> Result<Vec<Shipment>, StorageError> {
        (**self).list().await
    }
}

/// In-memory shipment repository for testing and database-less runs.
#[derive(Clone, Default)]
pub struct InMemoryShipmentRepository {
    shipments: Arc<RwLock<HashMap<ShipmentId, Shipment>>>,
}

impl InMemoryShipmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored shipments.
    pub async fn len(&self) -> usize {
        self.shipments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.shipments.read().await.is_empty()
    }
}

#[async_trait]
impl ShipmentRepository for InMemoryShipmentRepository {
    async fn insert(&self, mut shipment: Shipment) -> Result<Shipment, StorageError> {
        let mut shipments = self.shipments.write().await;
        let id = shipment.shipment_id().clone();
        if shipments.contains_key(&id) {
            return Err(StorageError::DuplicateKey(id.to_string()));
        }
        shipment.set_revision(0);
        shipments.insert(id, shipment.clone());
        Ok(shipment)
    }

    async fn find(&self, shipment_id: &ShipmentId) -> Result<Option<Shipment>, StorageError> {
        Ok(self.shipments.read().await.get(shipment_id).cloned())
    }

    async fn update(&self, mut shipment: Shipment) -> Result<Shipment, StorageError> {
        let mut shipments = self.shipments.write().await;
        let id = shipment.shipment_id().clone();
        let stored = shipments
            .get_mut(&id)
            .ok_or_else(|| StorageError::Missing(id.to_string()))?;

        if stored.revision() != shipment.revision() {
            return Err(StorageError::RevisionConflict {
                shipment_id: id,
                expected: shipment.revision(),
                actual: Some(stored.revision()),
            });
        }

        shipment.set_revision(shipment.revision() + 1);
        *stored = shipment.clone();
        Ok(shipment)
    }

    async fn list(&self) -> Result<Vec<Shipment>, StorageError> {
        let mut shipments: Vec<_> = self.shipments.read().await.values().cloned().collect();
        shipments.sort_by(Shipment::listing_cmp);
        Ok(shipments)
    }
}
