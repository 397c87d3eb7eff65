//! Domain layer for the shipment management system.
//!
//! This crate provides:
//! - the Shipment aggregate with its packing reconciliation workflow
//! - the command handler that loads, mutates, records and persists shipments
//! - shipping label attachment backed by pluggable blob storage
//! - the product catalog
//! - document repositories (in-memory and PostgreSQL) and the error taxonomy

pub mod aggregate;
pub mod command;
pub mod error;
pub mod product;
pub mod shipment;

pub use aggregate::{Aggregate, DomainEvent};
pub use command::{CommandHandler, CommandResult};
pub use error::{DomainError, ErrorKind, StorageError};
pub use product::{
    InMemoryProductRepository, NewProduct, PostgresProductRepository, Product, ProductCatalog,
    ProductError, ProductPage, ProductQuery, ProductRepository,
};
pub use shipment::{
    AttachLabel, ContentLine, CreateShipment, Dimensions, InMemoryLabelStorage,
    InMemoryShipmentRepository, LabelService, LabelStorage, LabelStorageError, LabelUpload,
    PackingLine, PostgresShipmentRepository, QuantityUpdate, RemoveLabel, ResetShipment, Shipment,
    ShipmentError, ShipmentEvent, ShipmentRepository, ShipmentService, ShipmentStatus,
    ShippingLabel, StoredLabel, UnitsPerBox, UpdateContents, UpdateInstructions, UpdatePacking,
};
