//! Asset catalog trait and in-memory implementation.
//!
//! The catalog models the external metadata database as a key-value lookup
//! service: the core only ever registers a record at upload time, looks one
//! up on the read path, and removes one when an asset is deleted.
//! Transactional guarantees live with whatever implements the trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use vermeer_core::{AssetId, AssetRecord};
use vermeer_error::VermeerResult;

/// Trait for the external asset metadata store.
#[async_trait]
pub trait AssetCatalog: Send + Sync {
    /// Register a freshly uploaded asset.
    async fn register(&self, record: AssetRecord) -> VermeerResult<()>;

    /// Look up an asset by ID. `None` means the asset is unknown.
    async fn lookup(&self, id: &AssetId) -> VermeerResult<Option<AssetRecord>>;

    /// Remove an asset record. Removing an unknown ID is a no-op.
    async fn remove(&self, id: &AssetId) -> VermeerResult<()>;
}

/// In-memory catalog.
///
/// Stores records in a HashMap protected by an RwLock for thread-safe access.
/// All data is lost when the catalog is dropped; production deployments put a
/// real database behind [`AssetCatalog`] instead.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    records: Arc<RwLock<HashMap<AssetId, AssetRecord>>>,
}

impl InMemoryCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered assets (for testing).
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the catalog is empty (for testing).
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AssetCatalog for InMemoryCatalog {
    async fn register(&self, record: AssetRecord) -> VermeerResult<()> {
        let id = *record.id();
        self.records.write().await.insert(id, record);
        tracing::debug!(%id, "Registered asset");
        Ok(())
    }

    async fn lookup(&self, id: &AssetId) -> VermeerResult<Option<AssetRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn remove(&self, id: &AssetId) -> VermeerResult<()> {
        if self.records.write().await.remove(id).is_some() {
            tracing::debug!(%id, "Removed asset record");
        }
        Ok(())
    }
}
