//! HTTP route handlers and shared state.

pub mod health;
pub mod labels;
pub mod metrics;
pub mod products;
pub mod shipments;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::{
    InMemoryProductRepository, InMemoryShipmentRepository, LabelService,
    LabelStorage, ProductCatalog, ProductRepository, ShipmentRepository, ShipmentService,
};
use history::{HistoryStore, InMemoryHistoryStore};
use serde::Serialize;

pub type DynShipmentRepository = Arc<dyn ShipmentRepository>;
pub type DynHistoryStore = Arc<dyn HistoryStore>;
pub type DynLabelStorage = Arc<dyn LabelStorage>;
pub type DynProductRepository = Arc<dyn ProductRepository>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub shipments: ShipmentService<DynShipmentRepository, DynHistoryStore>,
    pub labels: LabelService<DynShipmentRepository, DynHistoryStore, DynLabelStorage>,
    pub products: ProductCatalog<DynProductRepository>,
    /// Backend name reported by the health check.
    pub storage_backend: &'static str,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wires services over the given storage backends.
    pub fn new(
        shipments: DynShipmentRepository,
        history: DynHistoryStore,
        label_storage: DynLabelStorage,
        products: DynProductRepository,
        max_label_bytes: usize,
        storage_backend: &'static str,
    ) -> Self {
        Self {
            shipments: ShipmentService::new(shipments.clone(), history.clone()),
            labels: LabelService::new(shipments, history, label_storage)
                .with_max_label_bytes(max_label_bytes),
            products: ProductCatalog::new(products),
            storage_backend,
            started_at: Utc::now(),
        }
    }

    /// State backed entirely by in-memory stores.
    pub fn in_memory(label_storage: DynLabelStorage, max_label_bytes: usize) -> Self {
        Self::new(
            Arc::new(InMemoryShipmentRepository::new()),
            Arc::new(InMemoryHistoryStore::new()),
            label_storage,
            Arc::new(InMemoryProductRepository::new()),
            max_label_bytes,
            "memory",
        )
    }
}

/// Success envelope: `{ "success": true, "data": ..., "count"?: n }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
        }
    }

    pub fn counted(data: T, count: usize) -> Self {
        Self {
            success: true,
            data,
            count: Some(count),
        }
    }
}
