//! Blob storage trait definition.

use vermeer_error::VermeerResult;

/// Trait for pluggable blob storage backends.
///
/// Implementations store and retrieve opaque byte blobs under caller-supplied
/// keys. Keys are slash-separated relative paths (`originals/{uuid}`,
/// `derived/{uuid}/size_100x100.jpg`); the backend decides how they map onto
/// physical storage.
///
/// Originals and derivatives are both immutable once written: `put` on an
/// existing key is expected only with identical content, so backends may
/// treat it as a no-op or an overwrite with the same bytes.
#[async_trait::async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store a blob under the given key.
    ///
    /// The write must be atomic: a concurrent `get` observes either the whole
    /// blob or a not-found, never a partial write.
    async fn put(&self, key: &str, data: &[u8]) -> VermeerResult<()>;

    /// Retrieve a blob by key.
    ///
    /// Returns a `StorageError` with [`StorageErrorKind::NotFound`] when no
    /// blob exists under the key; callers use
    /// [`StorageError::is_not_found`] to tell a miss from a fault.
    ///
    /// [`StorageErrorKind::NotFound`]: vermeer_error::StorageErrorKind::NotFound
    /// [`StorageError::is_not_found`]: vermeer_error::StorageError::is_not_found
    async fn get(&self, key: &str) -> VermeerResult<Vec<u8>>;

    /// Delete a blob by key.
    ///
    /// Deleting a missing key is not an error; invalidation must be
    /// idempotent.
    async fn delete(&self, key: &str) -> VermeerResult<()>;

    /// Check whether a blob exists under the key.
    async fn exists(&self, key: &str) -> VermeerResult<bool>;

    /// Enumerate all keys starting with the given prefix.
    ///
    /// Used to cascade-invalidate every derivative of an asset by its
    /// `derived/{uuid}/` prefix.
    async fn list(&self, prefix: &str) -> VermeerResult<Vec<String>>;
}
