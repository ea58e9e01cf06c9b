//! Core data types for the Vermeer media service.
//!
//! This crate provides the value types shared across the workspace: asset
//! identity, catalog records, and the variant key codec that turns request
//! paths like `{uuid}/size_100x100_2x.jpg` into typed, canonical cache keys.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset;
mod ext;
mod key;

pub use asset::{AssetId, AssetRecord};
pub use ext::{mime_for_ext, normalize_ext};
pub use key::{
    MAX_DIMENSION, Processor, Scale, VariantKey, derived_storage_prefix, original_storage_key,
};
