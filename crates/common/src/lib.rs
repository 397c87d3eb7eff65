//! Shared types for the shipment management backend.

pub mod types;

pub use types::{LabelId, Meta, ShipmentId};
