//! On-disk label storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use domain::{LabelStorage, LabelStorageError, StoredLabel};

const LABELS_DIR: &str = "labels";
const LABELS_URL_PREFIX: &str = "/uploads/labels/";

/// Writes label documents under `<upload_dir>/labels`, served at
/// `/uploads/labels/<name>`.
#[derive(Debug, Clone)]
pub struct DiskLabelStorage {
    labels_dir: PathBuf,
}

impl DiskLabelStorage {
    pub fn new(upload_dir: impl AsRef<Path>) -> Self {
        Self {
            labels_dir: upload_dir.as_ref().join(LABELS_DIR),
        }
    }

    pub fn labels_dir(&self) -> &Path {
        &self.labels_dir
    }

    /// Maps a public URL back to a path inside the labels directory.
    fn path_for(&self, file_url: &str) -> Result<PathBuf, LabelStorageError> {
        let name = file_url
            .strip_prefix(LABELS_URL_PREFIX)
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
            .ok_or_else(|| LabelStorageError::ForeignUrl(file_url.to_string()))?;
        Ok(self.labels_dir.join(name))
    }
}

#[async_trait]
impl LabelStorage for DiskLabelStorage {
    async fn put(&self, stored_name: &str, bytes: &[u8]) -> Result<StoredLabel, LabelStorageError> {
        tokio::fs::create_dir_all(&self.labels_dir).await?;
        tokio::fs::write(self.labels_dir.join(stored_name), bytes).await?;

        Ok(StoredLabel {
            stored_name: stored_name.to_string(),
            file_url: format!("{LABELS_URL_PREFIX}{stored_name}"),
        })
    }

    async fn delete(&self, file_url: &str) -> Result<(), LabelStorageError> {
        let path = self.path_for(file_url)?;
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}
