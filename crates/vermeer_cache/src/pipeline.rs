//! The derivative pipeline: durable cache plus single-flight computation.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use vermeer_core::{AssetId, Processor, VariantKey, derived_storage_prefix};
use vermeer_error::{
    PipelineError, PipelineErrorKind, ProcessorError, ProcessorErrorKind, VermeerError,
    VermeerResult,
};
use vermeer_processor::{ProcessorRegistry, ResizeMode, TransformSpec};
use vermeer_storage::{AssetCatalog, BlobStorage};

/// Result broadcast to every waiter of a single-flight slot.
type SlotResult = Result<Vec<u8>, VermeerError>;

/// Number of times a waiter re-probes after its slot closed without a result
/// before giving up. A slot only closes silently if the computing task was
/// torn down mid-flight (runtime shutdown), so one retry normally suffices.
const SLOT_RETRIES: usize = 3;

/// Derivative cache with a single-flight computation engine.
///
/// The read path:
///
/// 1. Probe the durable store under the canonical key; a hit returns
///    immediately, no coordination needed against immutable blobs.
/// 2. On a miss, atomically check-then-insert a per-key slot. The first
///    caller becomes the computer; everyone else subscribes to the slot's
///    broadcast and suspends.
/// 3. The computer fetches the original, runs the processor on the blocking
///    pool under a time budget, writes the derivative durably, removes the
///    slot, and broadcasts the outcome to all waiters.
/// 4. Failures are broadcast but never cached; the next request starts a
///    fresh computation.
///
/// The computation runs in a spawned task, so a caller that disconnects
/// mid-flight never tears down work other waiters depend on: the derivative
/// still lands in the durable store.
///
/// `origin` keys bypass the derivative store entirely and read the original
/// bytes (an `origin_2x` request canonicalizes to the same key).
pub struct DerivativePipeline {
    storage: Arc<dyn BlobStorage>,
    catalog: Arc<dyn AssetCatalog>,
    registry: Arc<ProcessorRegistry>,
    mode: ResizeMode,
    transform_timeout: Duration,
    slots: Arc<Mutex<HashMap<String, broadcast::Sender<SlotResult>>>>,
}

impl DerivativePipeline {
    /// Create a pipeline over the given storage, catalog, and registry.
    ///
    /// Defaults: stretch resize policy, 30 second transform budget.
    pub fn new(
        storage: Arc<dyn BlobStorage>,
        catalog: Arc<dyn AssetCatalog>,
        registry: Arc<ProcessorRegistry>,
    ) -> Self {
        Self {
            storage,
            catalog,
            registry,
            mode: ResizeMode::Stretch,
            transform_timeout: Duration::from_secs(30),
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Set the aspect-ratio policy passed to processors.
    pub fn with_mode(mut self, mode: ResizeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Bound the wall-clock duration of a single transform.
    pub fn with_transform_timeout(mut self, timeout: Duration) -> Self {
        self.transform_timeout = timeout;
        self
    }

    /// Return the derivative for `key`, computing and caching it on demand.
    #[tracing::instrument(skip(self), fields(key = %key))]
    pub async fn get_or_create(&self, key: &VariantKey) -> VermeerResult<Vec<u8>> {
        if key.processor() == Processor::Origin {
            return self.fetch_original(key).await;
        }

        let canonical = key.canonical();
        let store_key = key.derived_storage_key();

        for _ in 0..SLOT_RETRIES {
            match self.storage.get(&store_key).await {
                Ok(bytes) => {
                    tracing::debug!(size = bytes.len(), "Derivative cache hit");
                    return Ok(bytes);
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }

            let mut rx = {
                let mut slots = self.slots.lock().await;
                match slots.entry(canonical.clone()) {
                    Entry::Occupied(entry) => {
                        tracing::debug!("Joining in-flight computation");
                        entry.get().subscribe()
                    }
                    Entry::Vacant(entry) => {
                        let (tx, rx) = broadcast::channel(1);
                        entry.insert(tx.clone());
                        self.spawn_computation(key.clone(), canonical.clone(), tx);
                        rx
                    }
                }
            };

            match rx.recv().await {
                Ok(result) => return result,
                Err(_closed) => {
                    // The computing task was torn down without broadcasting;
                    // re-probe the durable store and try again.
                    tracing::warn!("Single-flight slot closed without a result, retrying");
                }
            }
        }

        Err(PipelineError::new(PipelineErrorKind::SlotClosed(canonical)).into())
    }

    /// Drop every cached derivative of an asset.
    ///
    /// The cascade hook for original deletion or replacement: enumerates the
    /// asset's derivative prefix and deletes each entry. Returns the number
    /// of derivatives removed. In-flight computations are unaffected; a
    /// derivative written after this call belongs to the next request cycle.
    #[tracing::instrument(skip(self), fields(asset_id = %asset_id))]
    pub async fn invalidate(&self, asset_id: &AssetId) -> VermeerResult<usize> {
        let keys = self.storage.list(&derived_storage_prefix(asset_id)).await?;
        for key in &keys {
            self.storage.delete(key).await?;
        }
        tracing::info!(removed = keys.len(), "Invalidated derivatives");
        Ok(keys.len())
    }

    /// Read the original bytes for an `origin` request.
    async fn fetch_original(&self, key: &VariantKey) -> VermeerResult<Vec<u8>> {
        let asset_id = key.asset_id();
        self.catalog
            .lookup(asset_id)
            .await?
            .ok_or_else(|| {
                PipelineError::new(PipelineErrorKind::AssetNotFound(asset_id.to_string()))
            })?;
        self.storage.get(&key.original_storage_key()).await
    }

    /// Spawn the slot-holding computation as a detached task.
    ///
    /// Invariants: the durable write happens before the slot is removed, and
    /// the slot is removed before the result is broadcast, so any request
    /// arriving between removal and broadcast re-probes a store that already
    /// holds the derivative (success) or starts a fresh computation (failure
    /// is never cached).
    fn spawn_computation(
        &self,
        key: VariantKey,
        canonical: String,
        tx: broadcast::Sender<SlotResult>,
    ) {
        let storage = Arc::clone(&self.storage);
        let catalog = Arc::clone(&self.catalog);
        let registry = Arc::clone(&self.registry);
        let slots = Arc::clone(&self.slots);
        let mode = self.mode;
        let timeout = self.transform_timeout;

        tokio::spawn(async move {
            let result = compute(storage.as_ref(), catalog.as_ref(), &registry, mode, timeout, &key)
                .await;

            let result = match result {
                Ok(bytes) => storage
                    .put(&key.derived_storage_key(), &bytes)
                    .await
                    .map(|()| bytes),
                Err(e) => {
                    tracing::warn!(key = %canonical, error = %e, "Derivative computation failed");
                    Err(e)
                }
            };

            slots.lock().await.remove(&canonical);
            // No receivers means every caller disconnected; on success the
            // derivative is already durable, so the work is not wasted.
            let _ = tx.send(result);
        });
    }
}

impl std::fmt::Debug for DerivativePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivativePipeline")
            .field("mode", &self.mode)
            .field("transform_timeout", &self.transform_timeout)
            .finish()
    }
}

/// Fetch the original, resolve the processor, and run the transform on the
/// blocking pool under the time budget.
async fn compute(
    storage: &dyn BlobStorage,
    catalog: &dyn AssetCatalog,
    registry: &ProcessorRegistry,
    mode: ResizeMode,
    timeout: Duration,
    key: &VariantKey,
) -> SlotResult {
    let asset_id = key.asset_id();
    let record = catalog.lookup(asset_id).await?.ok_or_else(|| {
        PipelineError::new(PipelineErrorKind::AssetNotFound(asset_id.to_string()))
    })?;

    let original = storage.get(&key.original_storage_key()).await?;
    tracing::debug!(
        original_ext = record.ext().as_str(),
        original_bytes = original.len(),
        "Fetched original for transform"
    );

    let name = key.processor().as_str();
    let processor = registry.resolve(name).ok_or_else(|| {
        ProcessorError::new(ProcessorErrorKind::Unregistered(name.to_string()))
    })?;

    let spec = TransformSpec::new(
        key.width().unwrap_or(0),
        key.height().unwrap_or(0),
        key.scale(),
        key.ext(),
        mode,
    );

    let handle = tokio::task::spawn_blocking(move || processor.transform(&original, &spec));
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result.map_err(Into::into),
        Ok(Err(join_err)) => Err(PipelineError::new(PipelineErrorKind::TaskFailed(
            join_err.to_string(),
        ))
        .into()),
        Err(_elapsed) => Err(ProcessorError::new(ProcessorErrorKind::Timeout(format!(
            "{} exceeded {:?}",
            key.canonical(),
            timeout
        )))
        .into()),
    }
}
