//! Image transform processors for the Vermeer media service.
//!
//! A processor is a named transformation over image bytes. The registry maps
//! processor names to capability objects so the derivative pipeline can
//! dispatch dynamically; adding a processor never touches the cache engine.
//!
//! # Example
//!
//! ```rust,no_run
//! use vermeer_processor::{ProcessorRegistry, ResizeMode, TransformSpec};
//! use vermeer_core::Scale;
//!
//! let registry = ProcessorRegistry::with_defaults();
//! let size = registry.resolve("size").unwrap();
//!
//! let spec = TransformSpec::new(100, 100, Scale::Two, "jpg", ResizeMode::Stretch);
//! let src = std::fs::read("photo.jpg").unwrap();
//! let derivative = size.transform(&src, &spec).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod registry;
mod size;
mod spec;

pub use registry::{ImageProcessor, ProcessorRegistry};
pub use size::SizeProcessor;
pub use spec::{ResizeMode, TransformSpec};
pub use vermeer_error::{ProcessorError, ProcessorErrorKind};
