//! Tests for the upload orchestrator.

use std::sync::Arc;
use tempfile::TempDir;
use vermeer_core::original_storage_key;
use vermeer_error::{UploadErrorKind, VermeerErrorKind};
use vermeer_server::Uploader;
use vermeer_storage::{
    AssetCatalog, BlobStorage, FileSystemStorage, InMemoryCatalog, content_hash,
};

fn allowed() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string()]
}

struct Fixture {
    _dir: TempDir,
    storage: Arc<FileSystemStorage>,
    catalog: Arc<InMemoryCatalog>,
    uploader: Uploader,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSystemStorage::new(dir.path()).unwrap());
    let catalog = Arc::new(InMemoryCatalog::new());
    let uploader = Uploader::new(
        Arc::clone(&storage) as Arc<dyn BlobStorage>,
        Arc::clone(&catalog) as Arc<dyn AssetCatalog>,
        allowed(),
    );
    Fixture {
        _dir: dir,
        storage,
        catalog,
        uploader,
    }
}

#[tokio::test]
async fn upload_persists_original_and_registers_metadata() {
    let fx = fixture();
    let data = b"fake png bytes";

    let id = fx.uploader.upload(data, "photo.png").await.unwrap();

    let stored = fx.storage.get(&original_storage_key(&id)).await.unwrap();
    assert_eq!(stored, data);

    let record = fx.catalog.lookup(&id).await.unwrap().unwrap();
    assert_eq!(record.ext(), "png");
    assert_eq!(record.mime_type(), "image/png");
    assert_eq!(*record.size_bytes(), data.len() as i64);
    assert_eq!(record.content_hash(), &content_hash(data));
}

#[tokio::test]
async fn upload_normalizes_jpeg_extension() {
    let fx = fixture();

    let id = fx.uploader.upload(b"bytes", "scan.JPEG").await.unwrap();

    let record = fx.catalog.lookup(&id).await.unwrap().unwrap();
    assert_eq!(record.ext(), "jpg");
    assert_eq!(record.mime_type(), "image/jpeg");
}

#[tokio::test]
async fn distinct_uploads_get_distinct_ids() {
    let fx = fixture();

    let a = fx.uploader.upload(b"one", "a.png").await.unwrap();
    let b = fx.uploader.upload(b"one", "b.png").await.unwrap();

    assert_ne!(a, b);
    assert_eq!(fx.catalog.len().await, 2);
}

#[tokio::test]
async fn rejects_empty_payload() {
    let fx = fixture();

    let err = fx.uploader.upload(b"", "empty.png").await.unwrap_err();
    match err.kind() {
        VermeerErrorKind::Upload(u) => {
            assert!(matches!(u.kind, UploadErrorKind::EmptyPayload));
        }
        other => panic!("expected upload error, got {other}"),
    }
}

#[tokio::test]
async fn rejects_missing_extension() {
    let fx = fixture();

    let err = fx.uploader.upload(b"bytes", "noext").await.unwrap_err();
    match err.kind() {
        VermeerErrorKind::Upload(u) => {
            assert!(matches!(u.kind, UploadErrorKind::MissingExtension(_)));
        }
        other => panic!("expected upload error, got {other}"),
    }
}

#[tokio::test]
async fn rejects_disallowed_extension() {
    let fx = fixture();

    let err = fx.uploader.upload(b"bytes", "script.exe").await.unwrap_err();
    match err.kind() {
        VermeerErrorKind::Upload(u) => {
            assert!(matches!(u.kind, UploadErrorKind::DisallowedType(_)));
        }
        other => panic!("expected upload error, got {other}"),
    }
}
