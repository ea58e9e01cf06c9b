//! Vermeer - image upload and on-demand derivative service.
//!
//! Vermeer stores uploaded originals under generated UUIDs and derives
//! resized variants lazily from a declarative URL grammar, caching each
//! derivative durably with a single-flight guarantee: no matter how many
//! identical requests arrive concurrently, a given variant is computed at
//! most once at a time and stored exactly once.
//!
//! # URL grammar
//!
//! ```text
//! {uuid}/size_{width}x{height}.{ext}       resized variant
//! {uuid}/size_{width}x{height}_2x.{ext}    double-density variant
//! {uuid}/origin.{ext}                      original bytes
//! {uuid}/origin_2x.{ext}                   alias of origin
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vermeer::{
//!     AssetCatalog, BlobStorage, DerivativePipeline, FileSystemStorage, InMemoryCatalog,
//!     ProcessorRegistry, Uploader, VariantKey,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage: Arc<dyn BlobStorage> = Arc::new(FileSystemStorage::new("./media")?);
//!     let catalog: Arc<dyn AssetCatalog> = Arc::new(InMemoryCatalog::new());
//!     let registry = Arc::new(ProcessorRegistry::with_defaults());
//!
//!     let uploader = Uploader::new(
//!         Arc::clone(&storage),
//!         Arc::clone(&catalog),
//!         ["png".to_string(), "jpg".to_string()],
//!     );
//!     let pipeline = DerivativePipeline::new(storage, catalog, registry);
//!
//!     let id = uploader.upload(&std::fs::read("photo.png")?, "photo.png").await?;
//!     let key = VariantKey::parse(&format!("{id}/size_100x100.png"))?;
//!     let thumbnail = pipeline.get_or_create(&key).await?;
//!     println!("{} bytes", thumbnail.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Vermeer is organized as a workspace with focused crates:
//!
//! - `vermeer_error` - error types
//! - `vermeer_core` - value types and the variant key codec
//! - `vermeer_storage` - blob storage backends and the asset catalog
//! - `vermeer_processor` - image transforms and the processor registry
//! - `vermeer_cache` - the derivative cache and single-flight engine
//! - `vermeer_server` - upload orchestration and the HTTP surface
//!
//! This crate (`vermeer`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use vermeer_cache::DerivativePipeline;
pub use vermeer_core::{
    AssetId, AssetRecord, MAX_DIMENSION, Processor, Scale, VariantKey, derived_storage_prefix,
    mime_for_ext, normalize_ext, original_storage_key,
};
pub use vermeer_error::{
    KeyError, KeyErrorKind, PipelineError, PipelineErrorKind, ProcessorError, ProcessorErrorKind,
    StorageError, StorageErrorKind, UploadError, UploadErrorKind, VermeerError, VermeerErrorKind,
    VermeerResult,
};
pub use vermeer_processor::{
    ImageProcessor, ProcessorRegistry, ResizeMode, SizeProcessor, TransformSpec,
};
pub use vermeer_server::{AppState, ServerConfig, Uploader, create_router};
pub use vermeer_storage::{
    AssetCatalog, BlobStorage, FileSystemStorage, InMemoryCatalog, content_hash,
};
