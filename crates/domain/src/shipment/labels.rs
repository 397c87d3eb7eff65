//! Shipping label attachment.
//!
//! Label documents are written to a [`LabelStorage`] before the shipment
//! is saved and deleted after the reference is removed. Neither side
//! effect is transactional with the document write: a failed save removes
//! the fresh file best-effort, and a failed delete leaves an orphan that
//! is only logged.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{LabelId, ShipmentId};
use history::HistoryStore;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::command::CommandHandler;
use crate::error::DomainError;

use super::{
    AttachLabel, LabelUpload, RemoveLabel, Shipment, ShipmentError, ShipmentEvent,
    ShipmentRepository, ShippingLabel,
};

/// Default upper bound for a label document, in bytes.
pub const MAX_LABEL_BYTES: usize = 5 * 1024 * 1024;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Errors raised by label storage backends.
#[derive(Debug, Error)]
pub enum LabelStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL does not point into this storage.
    #[error("Label URL outside storage: {0}")]
    ForeignUrl(String),
}

/// Location of a stored label document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLabel {
    /// Generated name the document was stored under.
    pub stored_name: String,
    /// Public URL the document is served from.
    pub file_url: String,
}

/// Blob storage for label documents.
#[async_trait]
pub trait LabelStorage: Send + Sync {
    /// Writes a document under the given generated name.
    async fn put(&self, stored_name: &str, bytes: &[u8]) -> Result<StoredLabel, LabelStorageError>;

    /// Deletes the document served at `file_url`.
    async fn delete(&self, file_url: &str) -> Result<(), LabelStorageError>;
}

#[async_trait]
impl<T: LabelStorage + ?Sized> LabelStorage for Arc<T> {
    async fn put(&self, stored_name: &str, bytes: &[u8]) -> Result<StoredLabel, LabelStorageError> {
        (**self).put(stored_name, bytes).await
    }

    async fn delete(&self, file_url: &str) -> Result<(), LabelStorageError> {
        (**self).delete(file_url).await
    }
}

/// In-memory label storage keyed by URL.
#[derive(Clone, Default)]
pub struct InMemoryLabelStorage {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryLabelStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a document is stored at `file_url`.
    pub async fn contains(&self, file_url: &str) -> bool {
        self.files.read().await.contains_key(file_url)
    }

    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl LabelStorage for InMemoryLabelStorage {
    async fn put(&self, stored_name: &str, bytes: &[u8]) -> Result<StoredLabel, LabelStorageError> {
        let file_url = format!("/uploads/labels/{stored_name}");
        self.files
            .write()
            .await
            .insert(file_url.clone(), bytes.to_vec());
        Ok(StoredLabel {
            stored_name: stored_name.to_string(),
            file_url,
        })
    }

    async fn delete(&self, file_url: &str) -> Result<(), LabelStorageError> {
        match self.files.write().await.remove(file_url) {
            Some(_) => Ok(()),
            None => Err(LabelStorageError::Io(std::io::Error::from(
                std::io::ErrorKind::NotFound,
            ))),
        }
    }
}

/// Generated storage name: `label-<millis>-<token>.pdf`.
pub fn label_file_name(now: DateTime<Utc>) -> String {
    format!(
        "label-{}-{}.pdf",
        now.timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// Parses the `appliesTo` form value: a non-empty JSON array of
/// packing-line identifiers.
pub fn parse_applies_to(raw: Option<&str>) -> Result<Vec<String>, ShipmentError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ShipmentError::InvalidAppliesTo)?;

    let ids: Vec<String> =
        serde_json::from_str(raw).map_err(|_| ShipmentError::InvalidAppliesTo)?;
    if ids.is_empty() {
        return Err(ShipmentError::InvalidAppliesTo);
    }
    Ok(ids)
}

/// Service for attaching and removing shipping labels.
#[derive(Clone)]
pub struct LabelService<R, H, L> {
    handler: CommandHandler<R, H>,
    storage: L,
    max_label_bytes: usize,
}

impl<R, H, L> LabelService<R, H, L>
where
    R: ShipmentRepository,
    H: HistoryStore,
    L: LabelStorage,
{
    pub fn new(repository: R, history: H, storage: L) -> Self {
        Self {
            handler: CommandHandler::new(repository, history),
            storage,
            max_label_bytes: MAX_LABEL_BYTES,
        }
    }

    /// Overrides the size limit for uploaded documents.
    pub fn with_max_label_bytes(mut self, max_label_bytes: usize) -> Self {
        self.max_label_bytes = max_label_bytes;
        self
    }

    pub fn storage(&self) -> &L {
        &self.storage
    }

    /// Stores the document and attaches it to the shipment.
    #[tracing::instrument(skip(self, cmd), fields(shipment_id = %cmd.shipment_id))]
    pub async fn attach_label(&self, cmd: AttachLabel) -> Result<Shipment, DomainError> {
        let upload = self.check_upload(cmd.upload)?;
        let applies_to = parse_applies_to(cmd.applies_to.as_deref())?;

        let mut shipment = self.handler.load(&cmd.shipment_id).await?;

        let now = Utc::now();
        let stored = self
            .storage
            .put(&label_file_name(now), &upload.bytes)
            .await?;

        let label = ShippingLabel {
            id: LabelId::new(),
            file_name: upload.file_name,
            file_url: stored.file_url.clone(),
            applies_to,
            uploaded_at: now,
        };

        let events = match shipment.attach_label(label) {
            Ok(events) => events,
            Err(e) => {
                self.discard_file(&cmd.shipment_id, &stored.file_url).await;
                return Err(e.into());
            }
        };
        shipment.apply_events(events.iter().cloned());

        let shipment = match self.handler.persist(shipment).await {
            Ok(shipment) => shipment,
            Err(e) => {
                self.discard_file(&cmd.shipment_id, &stored.file_url).await;
                return Err(e);
            }
        };

        for event in &events {
            self.handler.record(shipment.shipment_id(), event).await;
        }

        metrics::counter!("shipping_labels_uploaded_total").increment(1);
        tracing::info!(file_url = %stored.file_url, "shipping label attached");

        Ok(shipment)
    }

    /// Returns the labels attached to a shipment.
    #[tracing::instrument(skip(self))]
    pub async fn list_labels(
        &self,
        shipment_id: &ShipmentId,
    ) -> Result<Vec<ShippingLabel>, DomainError> {
        Ok(self.handler.load(shipment_id).await?.labels().to_vec())
    }

    /// Detaches a label, then deletes its document.
    #[tracing::instrument(skip(self, cmd), fields(shipment_id = %cmd.shipment_id, label_id = %cmd.label_id))]
    pub async fn remove_label(&self, cmd: RemoveLabel) -> Result<Shipment, DomainError> {
        let result = self
            .handler
            .execute(&cmd.shipment_id, "remove_label", |shipment| {
                shipment.remove_label(cmd.label_id)
            })
            .await?;

        for event in &result.events {
            if let ShipmentEvent::LabelRemoved(data) = event {
                self.discard_file(&cmd.shipment_id, &data.file_url).await;
            }
        }

        Ok(result.shipment)
    }

    fn check_upload(&self, upload: Option<LabelUpload>) -> Result<LabelUpload, ShipmentError> {
        let upload = upload.ok_or(ShipmentError::LabelFileRequired)?;

        let content_type = upload.content_type.trim();
        if !content_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
            return Err(ShipmentError::LabelNotPdf);
        }

        if upload.bytes.len() > self.max_label_bytes {
            return Err(ShipmentError::LabelTooLarge {
                size: upload.bytes.len(),
                limit: self.max_label_bytes,
            });
        }

        Ok(upload)
    }

    async fn discard_file(&self, shipment_id: &ShipmentId, file_url: &str) {
        if let Err(e) = self.storage.delete(file_url).await {
            tracing::warn!(
                %shipment_id,
                %file_url,
                error = %e,
                "failed to delete label file"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use history::InMemoryHistoryStore;

    use super::*;
    use crate::error::StorageError;
    use crate::shipment::{ContentLine, CreateShipment, InMemoryShipmentRepository};

    type TestLabels = LabelService<InMemoryShipmentRepository, InMemoryHistoryStore, InMemoryLabelStorage>;

    async fn setup() -> (TestLabels, InMemoryHistoryStore, ShipmentId) {
        let repository = InMemoryShipmentRepository::new();
        let history = InMemoryHistoryStore::new();

        let mut shipment = Shipment::default();
        shipment.apply_events(
            Shipment::default()
                .create(CreateShipment::new(
                    "SHP-1",
                    "First",
                    vec![ContentLine::new("A", "X", 2)],
                ))
                .unwrap(),
        );
        repository.insert(shipment).await.unwrap();

        let service = LabelService::new(repository, history.clone(), InMemoryLabelStorage::new());
        (service, history, ShipmentId::from("SHP-1"))
    }

    fn pdf(bytes: usize) -> Option<LabelUpload> {
        Some(LabelUpload {
            file_name: "ups.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![b'%'; bytes],
        })
    }

    #[test]
    fn test_parse_applies_to() {
        assert_eq!(
            parse_applies_to(Some(r#"["l1","l2"]"#)).unwrap(),
            vec!["l1".to_string(), "l2".to_string()]
        );
        for raw in [None, Some(""), Some("[]"), Some("l1"), Some("{\"a\":1}"), Some("[1]")] {
            assert!(matches!(
                parse_applies_to(raw),
                Err(ShipmentError::InvalidAppliesTo)
            ));
        }
    }

    #[test]
    fn test_label_file_name_shape() {
        let name = label_file_name(Utc::now());
        assert!(name.starts_with("label-"));
        assert!(name.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_attach_label() {
        let (service, history, id) = setup().await;

        let shipment = service
            .attach_label(AttachLabel::new(id.clone(), pdf(10), Some(r#"["l1"]"#.into())))
            .await
            .unwrap();

        let label = &shipment.labels()[0];
        assert_eq!(label.file_name, "ups.pdf");
        assert_eq!(label.applies_to, vec!["l1".to_string()]);
        assert!(service.storage().contains(&label.file_url).await);

        let entries = history.list_for_shipment(&id).await.unwrap();
        assert_eq!(entries[0].event, "Shipping Label Uploaded");
    }

    #[tokio::test]
    async fn test_attach_rejects_bad_uploads() {
        let (service, _, id) = setup().await;
        let applies = || Some(r#"["l1"]"#.to_string());

        let err = service
            .attach_label(AttachLabel::new(id.clone(), None, applies()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Shipment(ShipmentError::LabelFileRequired)));

        let mut png = pdf(10);
        if let Some(upload) = png.as_mut() {
            upload.content_type = "image/png".to_string();
        }
        let err = service
            .attach_label(AttachLabel::new(id.clone(), png, applies()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Shipment(ShipmentError::LabelNotPdf)));

        let err = service
            .attach_label(AttachLabel::new(id.clone(), pdf(MAX_LABEL_BYTES + 1), applies()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Shipment(ShipmentError::LabelTooLarge { .. })));

        let err = service
            .attach_label(AttachLabel::new(id.clone(), pdf(10), Some("[]".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Shipment(ShipmentError::InvalidAppliesTo)));

        assert_eq!(service.storage().file_count().await, 0);
    }

    #[tokio::test]
    async fn test_attach_to_missing_shipment() {
        let (service, _, _) = setup().await;
        let err = service
            .attach_label(AttachLabel::new("nope", pdf(10), Some(r#"["l1"]"#.into())))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ShipmentNotFound(_)));
        assert_eq!(service.storage().file_count().await, 0);
    }

    #[tokio::test]
    async fn test_remove_label_deletes_file() {
        let (service, history, id) = setup().await;
        let shipment = service
            .attach_label(AttachLabel::new(id.clone(), pdf(10), Some(r#"["l1"]"#.into())))
            .await
            .unwrap();
        let label = shipment.labels()[0].clone();

        let shipment = service
            .remove_label(RemoveLabel::new(id.clone(), label.id))
            .await
            .unwrap();

        assert!(shipment.labels().is_empty());
        assert!(!service.storage().contains(&label.file_url).await);
        let entries = history.list_for_shipment(&id).await.unwrap();
        assert_eq!(entries[0].event, "Shipping Label Removed");
    }

    #[tokio::test]
    async fn test_remove_unknown_label() {
        let (service, _, id) = setup().await;
        let err = service
            .remove_label(RemoveLabel::new(id, LabelId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    /// Repository whose updates always fail.
    struct ReadOnlyRepository(InMemoryShipmentRepository);

    #[async_trait]
    impl ShipmentRepository for ReadOnlyRepository {
        async fn insert(&self, shipment: Shipment) -> Result<Shipment, StorageError> {
            self.0.insert(shipment).await
        }

        async fn find(&self, shipment_id: &ShipmentId) -> Result<Option<Shipment>, StorageError> {
            self.0.find(shipment_id).await
        }

        async fn update(&self, _shipment: Shipment) -> Result<Shipment, StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn list(&self) -> Result<Vec<Shipment>, StorageError> {
            self.0.list().await
        }
    }

    #[tokio::test]
    async fn test_failed_save_discards_file() {
        let inner = InMemoryShipmentRepository::new();
        let mut shipment = Shipment::default();
        shipment.apply_events(
            Shipment::default()
                .create(CreateShipment::new(
                    "SHP-1",
                    "First",
                    vec![ContentLine::new("A", "X", 2)],
                ))
                .unwrap(),
        );
        inner.insert(shipment).await.unwrap();

        let service = LabelService::new(
            ReadOnlyRepository(inner),
            InMemoryHistoryStore::new(),
            InMemoryLabelStorage::new(),
        );

        let err = service
            .attach_label(AttachLabel::new("SHP-1", pdf(10), Some(r#"["l1"]"#.into())))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::Storage);
        assert_eq!(service.storage().file_count().await, 0);
    }
}
