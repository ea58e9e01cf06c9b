//! Derivative cache and single-flight engine for the Vermeer media service.
//!
//! Given a canonical variant key, [`DerivativePipeline::get_or_create`]
//! returns the cached derivative or computes and stores it exactly once,
//! no matter how many identical requests arrive concurrently.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod pipeline;

pub use pipeline::DerivativePipeline;
