//! Tests for the derivative pipeline and its single-flight engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use vermeer_cache::DerivativePipeline;
use vermeer_core::{AssetId, AssetRecord, VariantKey, original_storage_key};
use vermeer_error::{ProcessorError, ProcessorErrorKind, VermeerErrorKind};
use vermeer_processor::{ImageProcessor, ProcessorRegistry, TransformSpec};
use vermeer_storage::{AssetCatalog, BlobStorage, FileSystemStorage, InMemoryCatalog};

/// Processor that counts invocations and fabricates deterministic output.
struct CountingProcessor {
    calls: Arc<AtomicUsize>,
    delay: Duration,
    /// Fail the first `fail_first` invocations with a decode error.
    fail_first: usize,
}

impl CountingProcessor {
    fn new(calls: Arc<AtomicUsize>, delay: Duration) -> Self {
        Self {
            calls,
            delay,
            fail_first: 0,
        }
    }

    fn failing_first(calls: Arc<AtomicUsize>, fail_first: usize) -> Self {
        Self {
            calls,
            delay: Duration::ZERO,
            fail_first,
        }
    }
}

impl ImageProcessor for CountingProcessor {
    fn transform(&self, src: &[u8], spec: &TransformSpec) -> Result<Vec<u8>, ProcessorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if call < self.fail_first {
            return Err(ProcessorError::new(ProcessorErrorKind::DecodeFailure(
                "transient".to_string(),
            )));
        }
        Ok(format!(
            "{}x{}@{}:{}",
            spec.width(),
            spec.height(),
            spec.scale(),
            src.len()
        )
        .into_bytes())
    }
}

struct Fixture {
    _dir: TempDir,
    storage: Arc<FileSystemStorage>,
    catalog: Arc<InMemoryCatalog>,
    pipeline: Arc<DerivativePipeline>,
    calls: Arc<AtomicUsize>,
    asset_id: AssetId,
}

async fn fixture(processor: impl FnOnce(Arc<AtomicUsize>) -> CountingProcessor) -> Fixture {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSystemStorage::new(dir.path()).unwrap());
    let catalog = Arc::new(InMemoryCatalog::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let mut registry = ProcessorRegistry::new();
    registry.register("size", Arc::new(processor(Arc::clone(&calls))));

    let pipeline = Arc::new(DerivativePipeline::new(
        Arc::clone(&storage) as Arc<dyn BlobStorage>,
        Arc::clone(&catalog) as Arc<dyn AssetCatalog>,
        Arc::new(registry),
    ));

    let asset_id = AssetId::new();
    storage
        .put(&original_storage_key(&asset_id), b"original png bytes")
        .await
        .unwrap();
    catalog
        .register(AssetRecord::new(asset_id, "png", "image/png", 18, "hash"))
        .await
        .unwrap();

    Fixture {
        _dir: dir,
        storage,
        catalog,
        pipeline,
        calls,
        asset_id,
    }
}

fn variant_key(id: &AssetId, spec: &str) -> VariantKey {
    VariantKey::parse(&format!("{id}/{spec}")).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_requests_run_one_transform() {
    let fx = fixture(|calls| CountingProcessor::new(calls, Duration::from_millis(100))).await;
    let key = variant_key(&fx.asset_id, "size_100x100.png");

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let pipeline = Arc::clone(&fx.pipeline);
            let key = key.clone();
            tokio::spawn(async move { pipeline.get_or_create(&key).await })
        })
        .collect();

    let mut outputs = Vec::new();
    for task in tasks {
        outputs.push(task.await.unwrap().unwrap());
    }

    assert_eq!(fx.calls.load(Ordering::SeqCst), 1);
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn repeated_requests_are_byte_identical_and_cached() {
    let fx = fixture(|calls| CountingProcessor::new(calls, Duration::ZERO)).await;
    let key = variant_key(&fx.asset_id, "size_50x50.png");

    let first = fx.pipeline.get_or_create(&key).await.unwrap();
    let second = fx.pipeline.get_or_create(&key).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fx.calls.load(Ordering::SeqCst), 1);

    // The derivative is durably stored under the canonical key
    assert!(
        fx.storage
            .exists(&key.derived_storage_key())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn density_variants_are_independent_cache_entries() {
    let fx = fixture(|calls| CountingProcessor::new(calls, Duration::ZERO)).await;
    let one = variant_key(&fx.asset_id, "size_100x100.png");
    let two = variant_key(&fx.asset_id, "size_100x100_2x.png");

    let a = fx.pipeline.get_or_create(&one).await.unwrap();
    let b = fx.pipeline.get_or_create(&two).await.unwrap();

    assert_ne!(a, b);
    assert_eq!(fx.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let fx = fixture(|calls| CountingProcessor::failing_first(calls, 1)).await;
    let key = variant_key(&fx.asset_id, "size_10x10.png");

    let err = fx.pipeline.get_or_create(&key).await.unwrap_err();
    assert!(matches!(err.kind(), VermeerErrorKind::Processor(_)));
    assert!(
        !fx.storage
            .exists(&key.derived_storage_key())
            .await
            .unwrap()
    );

    // Next request retries from scratch and succeeds
    let bytes = fx.pipeline.get_or_create(&key).await.unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(fx.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalidate_forces_recomputation() {
    let fx = fixture(|calls| CountingProcessor::new(calls, Duration::ZERO)).await;
    let key = variant_key(&fx.asset_id, "size_20x20.png");

    fx.pipeline.get_or_create(&key).await.unwrap();
    assert_eq!(fx.calls.load(Ordering::SeqCst), 1);

    let removed = fx.pipeline.invalidate(&fx.asset_id).await.unwrap();
    assert_eq!(removed, 1);

    fx.pipeline.get_or_create(&key).await.unwrap();
    assert_eq!(fx.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalidate_with_deleted_original_fails_recomputation() {
    let fx = fixture(|calls| CountingProcessor::new(calls, Duration::ZERO)).await;
    let key = variant_key(&fx.asset_id, "size_20x20.png");

    fx.pipeline.get_or_create(&key).await.unwrap();
    fx.pipeline.invalidate(&fx.asset_id).await.unwrap();

    // Delete the original and its record, as an external deletion would
    fx.storage
        .delete(&original_storage_key(&fx.asset_id))
        .await
        .unwrap();
    fx.catalog.remove(&fx.asset_id).await.unwrap();

    let err = fx.pipeline.get_or_create(&key).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn origin_returns_original_bytes_unchanged() {
    let fx = fixture(|calls| CountingProcessor::new(calls, Duration::ZERO)).await;

    let origin = variant_key(&fx.asset_id, "origin.png");
    let bytes = fx.pipeline.get_or_create(&origin).await.unwrap();
    assert_eq!(bytes, b"original png bytes");

    // origin_2x aliases origin and never invokes a processor
    let double = variant_key(&fx.asset_id, "origin_2x.png");
    assert_eq!(fx.pipeline.get_or_create(&double).await.unwrap(), bytes);
    assert_eq!(fx.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_asset_is_not_found() {
    let fx = fixture(|calls| CountingProcessor::new(calls, Duration::ZERO)).await;
    let stranger = AssetId::new();

    let origin = variant_key(&stranger, "origin.png");
    assert!(fx.pipeline.get_or_create(&origin).await.unwrap_err().is_not_found());

    let sized = variant_key(&stranger, "size_10x10.png");
    assert!(fx.pipeline.get_or_create(&sized).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn evicted_derivative_is_regenerated() {
    let fx = fixture(|calls| CountingProcessor::new(calls, Duration::ZERO)).await;
    let key = variant_key(&fx.asset_id, "size_30x30.png");

    let first = fx.pipeline.get_or_create(&key).await.unwrap();

    // Simulate an external retention policy removing the blob
    fx.storage.delete(&key.derived_storage_key()).await.unwrap();

    let second = fx.pipeline.get_or_create(&key).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fx.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn aborted_caller_leaves_computation_running_to_completion() {
    let fx = fixture(|calls| CountingProcessor::new(calls, Duration::from_millis(300))).await;
    let key = variant_key(&fx.asset_id, "size_40x40.png");

    let caller = {
        let pipeline = Arc::clone(&fx.pipeline);
        let key = key.clone();
        tokio::spawn(async move { pipeline.get_or_create(&key).await })
    };

    // Abort the caller mid-transform; the computation is a detached task and
    // must keep going.
    tokio::time::sleep(Duration::from_millis(100)).await;
    caller.abort();
    assert!(caller.await.unwrap_err().is_cancelled());

    let bytes = fx.pipeline.get_or_create(&key).await.unwrap();
    assert!(!bytes.is_empty());
    assert!(
        fx.storage
            .exists(&key.derived_storage_key())
            .await
            .unwrap()
    );
    // The aborted caller's transform is the only one that ever ran
    assert_eq!(fx.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_transform_times_out() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSystemStorage::new(dir.path()).unwrap());
    let catalog = Arc::new(InMemoryCatalog::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let mut registry = ProcessorRegistry::new();
    registry.register(
        "size",
        Arc::new(CountingProcessor::new(
            Arc::clone(&calls),
            Duration::from_millis(500),
        )),
    );

    let pipeline = DerivativePipeline::new(
        storage.clone() as Arc<dyn BlobStorage>,
        catalog.clone() as Arc<dyn AssetCatalog>,
        Arc::new(registry),
    )
    .with_transform_timeout(Duration::from_millis(50));

    let asset_id = AssetId::new();
    storage
        .put(&original_storage_key(&asset_id), b"bytes")
        .await
        .unwrap();
    catalog
        .register(AssetRecord::new(asset_id, "png", "image/png", 5, "hash"))
        .await
        .unwrap();

    let key = variant_key(&asset_id, "size_10x10.png");
    let err = pipeline.get_or_create(&key).await.unwrap_err();
    match err.kind() {
        VermeerErrorKind::Processor(p) => {
            assert!(matches!(p.kind, ProcessorErrorKind::Timeout(_)));
        }
        other => panic!("expected processor timeout, got {other}"),
    }
    // Nothing durable was written for the timed-out key
    assert!(!storage.exists(&key.derived_storage_key()).await.unwrap());
}
