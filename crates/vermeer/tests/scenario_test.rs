//! End-to-end scenario: upload an original, then fetch derivatives and the
//! origin through the full stack (uploader, catalog, storage, pipeline).

use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, ImageReader, RgbaImage};
use tempfile::TempDir;
use vermeer::{
    AssetCatalog, AssetId, BlobStorage, DerivativePipeline, FileSystemStorage, InMemoryCatalog,
    ProcessorRegistry, Uploader, VariantKey,
};

struct Stack {
    uploader: Uploader,
    pipeline: DerivativePipeline,
    catalog: Arc<dyn AssetCatalog>,
    _root: TempDir,
}

fn stack() -> Stack {
    let root = TempDir::new().unwrap();
    let storage: Arc<dyn BlobStorage> = Arc::new(FileSystemStorage::new(root.path()).unwrap());
    let catalog: Arc<dyn AssetCatalog> = Arc::new(InMemoryCatalog::new());
    let registry = Arc::new(ProcessorRegistry::with_defaults());
    let uploader = Uploader::new(
        Arc::clone(&storage),
        Arc::clone(&catalog),
        ["png".to_string(), "jpg".to_string()],
    );
    let pipeline = DerivativePipeline::new(storage, Arc::clone(&catalog), registry);
    Stack {
        uploader,
        pipeline,
        catalog,
        _root: root,
    }
}

/// A 10x10 opaque red PNG.
fn png_10x10() -> Vec<u8> {
    let img = RgbaImage::from_pixel(10, 10, image::Rgba([200, 30, 30, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn decode_dimensions(bytes: &[u8]) -> (u32, u32) {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap();
    (img.width(), img.height())
}

async fn fetch(pipeline: &DerivativePipeline, id: AssetId, path: &str) -> Vec<u8> {
    let key = VariantKey::parse(&format!("{id}/{path}")).unwrap();
    pipeline.get_or_create(&key).await.unwrap()
}

#[tokio::test]
async fn upload_then_fetch_derivatives_and_origin() {
    let stack = stack();
    let original = png_10x10();

    let id = stack.uploader.upload(&original, "photo.png").await.unwrap();

    let record = stack.catalog.lookup(&id).await.unwrap().unwrap();
    assert_eq!(record.ext(), "png");
    assert_eq!(*record.size_bytes(), original.len() as i64);

    let half = fetch(&stack.pipeline, id, "size_5x5.png").await;
    assert_eq!(decode_dimensions(&half), (5, 5));

    let half_retina = fetch(&stack.pipeline, id, "size_5x5_2x.png").await;
    assert_eq!(decode_dimensions(&half_retina), (10, 10));

    let origin = fetch(&stack.pipeline, id, "origin.png").await;
    assert_eq!(origin, original);
}

#[tokio::test]
async fn origin_retina_alias_returns_original_bytes() {
    let stack = stack();
    let original = png_10x10();
    let id = stack.uploader.upload(&original, "photo.png").await.unwrap();

    let origin_2x = fetch(&stack.pipeline, id, "origin_2x.png").await;
    assert_eq!(origin_2x, original);
}

#[tokio::test]
async fn repeated_fetch_is_byte_stable() {
    let stack = stack();
    let id = stack
        .uploader
        .upload(&png_10x10(), "photo.png")
        .await
        .unwrap();

    let first = fetch(&stack.pipeline, id, "size_7x3.png").await;
    let second = fetch(&stack.pipeline, id, "size_7x3.png").await;
    assert_eq!(first, second);
    assert_eq!(decode_dimensions(&first), (7, 3));
}

#[tokio::test]
async fn invalidate_then_refetch_regenerates() {
    let stack = stack();
    let id = stack
        .uploader
        .upload(&png_10x10(), "photo.png")
        .await
        .unwrap();

    let before = fetch(&stack.pipeline, id, "size_4x4.png").await;
    let removed = stack.pipeline.invalidate(&id).await.unwrap();
    assert_eq!(removed, 1);

    let after = fetch(&stack.pipeline, id, "size_4x4.png").await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn unknown_asset_maps_to_not_found() {
    let stack = stack();
    let id = AssetId::new();

    let key = VariantKey::parse(&format!("{id}/size_5x5.png")).unwrap();
    let err = stack.pipeline.get_or_create(&key).await.unwrap_err();
    assert!(err.is_not_found());
}
