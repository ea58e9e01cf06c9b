//! Upload orchestration.

use std::collections::HashSet;
use std::sync::Arc;
use vermeer_core::{AssetId, AssetRecord, mime_for_ext, normalize_ext, original_storage_key};
use vermeer_error::{UploadError, UploadErrorKind, VermeerResult};
use vermeer_storage::{AssetCatalog, BlobStorage, content_hash};

/// Accepts raw upload bytes, validates them, allocates a fresh identity,
/// persists the original, and registers catalog metadata.
///
/// Authentication happens in the HTTP layer before the orchestrator is
/// reached; by the time `upload` runs the caller is already authorized.
pub struct Uploader {
    storage: Arc<dyn BlobStorage>,
    catalog: Arc<dyn AssetCatalog>,
    allowed_extensions: HashSet<String>,
}

impl Uploader {
    /// Create an uploader with the given extension allowlist.
    ///
    /// Extensions are normalized, so an allowlist containing `jpeg` accepts
    /// `.jpg` uploads and vice versa.
    pub fn new(
        storage: Arc<dyn BlobStorage>,
        catalog: Arc<dyn AssetCatalog>,
        allowed_extensions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            storage,
            catalog,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| normalize_ext(&e))
                .collect(),
        }
    }

    /// Store an uploaded original and return its fresh asset ID.
    #[tracing::instrument(skip(self, data), fields(size = data.len(), filename))]
    pub async fn upload(&self, data: &[u8], filename: &str) -> VermeerResult<AssetId> {
        if data.is_empty() {
            return Err(UploadError::new(UploadErrorKind::EmptyPayload).into());
        }

        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| {
                UploadError::new(UploadErrorKind::MissingExtension(filename.to_string()))
            })?;
        let ext = normalize_ext(ext);

        if !self.allowed_extensions.contains(&ext) {
            return Err(UploadError::new(UploadErrorKind::DisallowedType(ext)).into());
        }

        let id = AssetId::new();
        let mime = mime_for_ext(&ext);
        let hash = content_hash(data);

        self.storage.put(&original_storage_key(&id), data).await?;
        self.catalog
            .register(AssetRecord::new(id, ext.clone(), mime, data.len() as i64, hash))
            .await?;

        tracing::info!(%id, ext = %ext, size = data.len(), "Stored uploaded original");
        Ok(id)
    }
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader")
            .field("allowed_extensions", &self.allowed_extensions)
            .finish()
    }
}
