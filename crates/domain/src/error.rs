//! Domain error types.

use common::ShipmentId;
use history::HistoryError;
use thiserror::Error;

use crate::product::ProductError;
use crate::shipment::{LabelStorageError, ShipmentError};

/// Broad category of a failure, used by outer layers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input failed a business or shape rule.
    Validation,
    /// A referenced shipment, SKU or label does not exist.
    NotFound,
    /// A uniqueness or concurrency conflict.
    Conflict,
    /// Persistence or file storage failed.
    Storage,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Storage => "STORAGE_ERROR",
        }
    }
}

/// Errors raised by document repositories.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A unique key is already taken.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The stored document changed since it was loaded.
    #[error(
        "Revision conflict for shipment {shipment_id}: expected {expected}, found {actual:?}"
    )]
    RevisionConflict {
        shipment_id: ShipmentId,
        expected: i64,
        actual: Option<i64>,
    },

    /// The document to update no longer exists.
    #[error("Document not found: {0}")]
    Missing(String),
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::DuplicateKey(_) | StorageError::RevisionConflict { .. } => {
                ErrorKind::Conflict
            }
            StorageError::Missing(_) => ErrorKind::NotFound,
            StorageError::Database(_) | StorageError::Serialization(_) => ErrorKind::Storage,
        }
    }
}

const UNIQUE_VIOLATION: &str = "23505";

/// Returns true for a Postgres unique constraint violation.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A shipment command was rejected.
    #[error("{0}")]
    Shipment(ShipmentError),

    /// A product could not be created.
    #[error("{0}")]
    Product(ProductError),

    /// No shipment with this ID exists.
    #[error("Shipment not found: {0}")]
    ShipmentNotFound(ShipmentId),

    /// A uniqueness rule was violated.
    #[error("{0}")]
    Conflict(String),

    /// Document storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// History could not be read.
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Label file storage failed.
    #[error("Label storage error: {0}")]
    LabelStorage(#[from] LabelStorageError),
}

impl DomainError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Shipment(e) => e.kind(),
            DomainError::Product(_) => ErrorKind::Validation,
            DomainError::ShipmentNotFound(_) => ErrorKind::NotFound,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::Storage(e) => e.kind(),
            DomainError::History(_) | DomainError::LabelStorage(_) => ErrorKind::Storage,
        }
    }
}

impl From<ShipmentError> for DomainError {
    fn from(e: ShipmentError) -> Self {
        DomainError::Shipment(e)
    }
}

impl From<ProductError> for DomainError {
    fn from(e: ProductError) -> Self {
        DomainError::Product(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let not_found: DomainError = ShipmentError::SkuNotFound {
            sku: "A".to_string(),
        }
        .into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let invalid: DomainError = ShipmentError::NoContents.into();
        assert_eq!(invalid.kind(), ErrorKind::Validation);

        let conflict = DomainError::from(StorageError::RevisionConflict {
            shipment_id: ShipmentId::from("S1"),
            expected: 1,
            actual: Some(2),
        });
        assert_eq!(conflict.kind(), ErrorKind::Conflict);

        let missing = DomainError::ShipmentNotFound(ShipmentId::from("S1"));
        assert_eq!(missing.kind().code(), "NOT_FOUND");
    }

    #[test]
    fn test_messages_pass_through() {
        let err: DomainError = ShipmentError::PriorityIndexRequired.into();
        assert_eq!(
            err.to_string(),
            "priorityIndex is required when isPriority is true."
        );
    }
}
