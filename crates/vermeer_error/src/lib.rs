//! Error types for the Vermeer media service.
//!
//! This crate provides the foundation error types used throughout the Vermeer
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Every error type is `Clone`: the derivative pipeline broadcasts a failed
//! computation to all waiters of a single-flight slot, so one error value
//! must be deliverable to many receivers.
//!
//! # Examples
//!
//! ```
//! use vermeer_error::{VermeerResult, StorageError, StorageErrorKind};
//!
//! fn read_blob() -> VermeerResult<Vec<u8>> {
//!     Err(StorageError::new(StorageErrorKind::NotFound("originals/abc".into())))?
//! }
//!
//! match read_blob() {
//!     Ok(data) => println!("Got {} bytes", data.len()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod key;
mod pipeline;
mod processor;
mod storage;
mod upload;

pub use error::{VermeerError, VermeerErrorKind, VermeerResult};
pub use key::{KeyError, KeyErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use processor::{ProcessorError, ProcessorErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use upload::{UploadError, UploadErrorKind};
