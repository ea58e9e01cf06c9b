//! Blob storage and asset catalog for the Vermeer media service.
//!
//! This crate provides the identity & storage layer: a pluggable key-value
//! blob store for original and derivative bytes, plus the catalog trait that
//! models the external metadata database as a lookup service.
//!
//! # Features
//!
//! - **Keyed blob storage**: originals under `originals/{uuid}`, derivatives
//!   under `derived/{uuid}/{canonical file}`
//! - **Pluggable backends**: trait-based abstraction; the filesystem backend
//!   ships here, S3-style backends can slot in behind the same trait
//! - **Atomic writes**: temp file + rename, safe under concurrent access
//! - **Prefix enumeration**: lets the pipeline cascade-invalidate every
//!   derivative of an asset
//!
//! # Example
//!
//! ```rust
//! use vermeer_storage::{BlobStorage, FileSystemStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/vermeer")?;
//!
//! storage.put("originals/abc", b"png bytes").await?;
//! let bytes = storage.get("originals/abc").await?;
//! assert_eq!(bytes, b"png bytes");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod filesystem;
mod storage;

pub use catalog::{AssetCatalog, InMemoryCatalog};
pub use filesystem::{FileSystemStorage, content_hash};
pub use storage::BlobStorage;
pub use vermeer_error::{StorageError, StorageErrorKind};
