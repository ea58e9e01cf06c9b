//! Filesystem-based blob storage implementation.
//!
//! Blobs are stored at `{base_path}/{key}`, so the storage key namespace maps
//! directly onto a directory tree:
//!
//! ```text
//! /var/vermeer/media/
//! ├── originals/
//! │   ├── 0c18bf64-9d37-4c9f-b8b5-23be3e8cf696
//! │   └── 7d5f2a10-30cc-47a3-a9e4-2f6f1b9f05b1
//! └── derived/
//!     └── 0c18bf64-9d37-4c9f-b8b5-23be3e8cf696/
//!         ├── size_100x100.jpg
//!         └── size_100x100_2x.jpg
//! ```

use crate::BlobStorage;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use vermeer_error::{StorageError, StorageErrorKind, VermeerResult};

/// Filesystem storage backend.
///
/// # Features
///
/// - **Atomic writes**: temp file + rename, so readers never observe a
///   partially written blob
/// - **Prefix enumeration**: per-asset derivative directories make cascade
///   invalidation a directory listing
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> VermeerResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self { base_path })
    }

    /// Resolve a storage key to a filesystem path.
    ///
    /// Keys are relative slash-separated paths; segments may only contain
    /// characters that cannot escape the base directory.
    fn resolve(&self, key: &str) -> VermeerResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }
}

fn validate_key(key: &str) -> VermeerResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && key.split('/').all(|segment| {
            !segment.is_empty()
                && segment != ".."
                && segment != "."
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        });
    if !valid {
        return Err(StorageError::new(StorageErrorKind::InvalidKey(key.to_string())).into());
    }
    Ok(())
}

/// Compute the SHA-256 hash of a blob, hex-encoded.
///
/// Recorded in the asset catalog at upload time so external consumers can
/// verify original content.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[async_trait::async_trait]
impl BlobStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, data), fields(key, size = data.len()))]
    async fn put(&self, key: &str, data: &[u8]) -> VermeerResult<()> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Write to temp file first, then rename for atomicity. The suffix is
        // appended rather than substituted so sibling blobs that differ only
        // in extension never share a temp path.
        let temp_path = path.with_file_name(format!(
            "{}.tmp",
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
        ));
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::BlobWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::BlobWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::debug!(key, size = data.len(), "Stored blob");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(key))]
    async fn get(&self, key: &str) -> VermeerResult<Vec<u8>> {
        let path = self.resolve(key)?;

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(key.to_string()))
            } else {
                StorageError::new(StorageErrorKind::BlobRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::debug!(key, size = data.len(), "Retrieved blob");
        Ok(data)
    }

    #[tracing::instrument(skip(self), fields(key))]
    async fn delete(&self, key: &str) -> VermeerResult<()> {
        let path = self.resolve(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key, "Deleted blob");
                Ok(())
            }
            // Deletion is idempotent
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::BlobWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }

    #[tracing::instrument(skip(self), fields(key))]
    async fn exists(&self, key: &str) -> VermeerResult<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }

    #[tracing::instrument(skip(self), fields(prefix))]
    async fn list(&self, prefix: &str) -> VermeerResult<Vec<String>> {
        let dir_key = prefix.trim_end_matches('/');
        let dir = self.resolve(dir_key)?;

        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::BlobRead(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::new(StorageErrorKind::BlobRead(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })? {
            let path = entry.path();
            if path.is_file()
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
                // In-flight writes are invisible until renamed into place
                && !name.ends_with(".tmp")
            {
                keys.push(format!("{}/{}", dir_key, name));
            }
        }

        keys.sort();
        tracing::debug!(prefix, count = keys.len(), "Enumerated blobs");
        Ok(keys)
    }
}
