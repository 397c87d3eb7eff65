//! Append-only shipment history log.
//!
//! Every state-changing action on a shipment produces a [`HistoryEntry`].
//! Entries are grouped into one logical stream per shipment and read back
//! newest first. Writes go through [`HistoryRecorder`], which never lets a
//! storage failure escape to the caller.

pub mod entry;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod recorder;
pub mod store;

pub use common::ShipmentId;
pub use entry::{EntryId, HistoryEntry};
pub use error::{HistoryError, Result};
pub use memory::InMemoryHistoryStore;
pub use postgres::{PostgresHistoryStore, run_migrations};
pub use recorder::HistoryRecorder;
pub use store::HistoryStore;
