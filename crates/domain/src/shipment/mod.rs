//! Shipment aggregate, packing reconciliation workflow and related types.

mod aggregate;
mod commands;
mod events;
mod labels;
mod postgres;
mod repository;
mod service;
mod state;
mod value_objects;

pub use aggregate::Shipment;
pub use commands::*;
pub use events::{
    InstructionsUpdatedData, LabelAttachedData, LabelRemovedData, PackingUpdatedData,
    QuantityUpdatedData, ShipmentCreatedData, ShipmentEvent, SkuAddedData,
};
pub use labels::{
    InMemoryLabelStorage, LabelService, LabelStorage, LabelStorageError, MAX_LABEL_BYTES,
    StoredLabel, label_file_name, parse_applies_to,
};
pub use postgres::PostgresShipmentRepository;
pub use repository::{InMemoryShipmentRepository, ShipmentRepository};
pub use service::ShipmentService;
pub use state::ShipmentStatus;
pub use value_objects::{ContentLine, Dimensions, PackingLine, ShippingLabel, UnitsPerBox};

use common::LabelId;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors produced by shipment commands.
#[derive(Debug, Error)]
pub enum ShipmentError {
    /// Shipment ID is empty after trimming.
    #[error("Shipment ID is required")]
    ShipmentIdRequired,

    /// Shipment name is empty after trimming.
    #[error("Shipment name is required")]
    ShipmentNameRequired,

    /// No content lines were supplied at creation.
    #[error("At least one shipment content item is required")]
    NoContents,

    /// A content line lacks its SKU or ASIN.
    #[error("Item {position} is missing required fields (sku, asin, or quantity)")]
    MissingContentFields { position: usize },

    /// A content line quantity is below 1.
    #[error("Item {position}: Quantity must be at least 1 (got {quantity})")]
    ContentQuantityTooLow { position: usize, quantity: u32 },

    /// The same SKU appears twice in the contents.
    #[error("Duplicate SKU in shipment contents: {sku}")]
    DuplicateSku { sku: String },

    /// Priority shipment without a display index.
    #[error("priorityIndex is required when isPriority is true.")]
    PriorityIndexRequired,

    /// Status outside the enumeration.
    #[error("Invalid status '{value}'. Must be one of: Draft, Unpacked, Packed, Shipped")]
    InvalidStatus { value: String },

    /// A packing line failed schema checks.
    #[error("Packing line {position}: {reason}")]
    InvalidPackingLine { position: usize, reason: String },

    /// SKU referenced by an update is not in the contents.
    #[error("SKU {sku} not found in shipment contents")]
    SkuNotFound { sku: String },

    /// Quantity update to zero.
    #[error("Quantity for SKU {sku} must be at least 1")]
    InvalidQuantity { sku: String },

    /// Reduction below what is already packed.
    #[error(
        "Cannot reduce SKU {sku} to {requested}: {packed} units are already packed (cannot reduce below packed units)"
    )]
    BelowPackedQuantity {
        sku: String,
        requested: u32,
        packed: u64,
    },

    /// Addition of a SKU that is already present.
    #[error("SKU {sku} already exists in shipment contents")]
    SkuAlreadyExists { sku: String },

    /// Addition line lacks SKU/ASIN or has quantity below 1.
    #[error("New content line for SKU '{sku}' is invalid: sku, asin and a quantity of at least 1 are required")]
    InvalidAddition { sku: String },

    /// Packing instructions payload is not a string.
    #[error("packingInstructions must be a string")]
    InstructionsNotText,

    /// No label file in the upload.
    #[error("No file uploaded. Please provide a PDF file.")]
    LabelFileRequired,

    /// Label file is not a PDF.
    #[error("Only PDF files are allowed")]
    LabelNotPdf,

    /// Label file exceeds the size limit.
    #[error("Label file is {size} bytes; the limit is {limit} bytes")]
    LabelTooLarge { size: usize, limit: usize },

    /// `appliesTo` missing or not a non-empty JSON array of identifiers.
    #[error("Invalid appliesTo format. Must be a non-empty JSON array of packing line IDs")]
    InvalidAppliesTo,

    /// Label not attached to this shipment.
    #[error("Label not found: {label_id}")]
    LabelNotFound { label_id: LabelId },

    /// Command targets an uninitialized shipment.
    #[error("Shipment has not been created")]
    NotCreated,

    /// Creation attempted on an existing aggregate.
    #[error("Shipment already created")]
    AlreadyCreated,
}

impl ShipmentError {
    /// Category reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShipmentError::SkuNotFound { .. }
            | ShipmentError::LabelNotFound { .. }
            | ShipmentError::NotCreated => ErrorKind::NotFound,
            ShipmentError::AlreadyCreated => ErrorKind::Conflict,
            _ => ErrorKind::Validation,
        }
    }
}
