//! Processor trait and registry.

use crate::{SizeProcessor, TransformSpec};
use std::collections::HashMap;
use std::sync::Arc;
use vermeer_error::ProcessorError;

/// A named transformation over image bytes.
///
/// Transforms are synchronous and CPU-bound by design; the derivative
/// pipeline runs them on the blocking thread pool.
pub trait ImageProcessor: Send + Sync {
    /// Produce derivative bytes from original bytes.
    fn transform(&self, src: &[u8], spec: &TransformSpec) -> Result<Vec<u8>, ProcessorError>;
}

/// Registry mapping processor names to capability objects.
///
/// The set of processors is fixed at construction; the registry is shared
/// immutably across requests afterwards.
///
/// # Example
///
/// ```
/// use vermeer_processor::ProcessorRegistry;
///
/// let registry = ProcessorRegistry::with_defaults();
/// assert!(registry.resolve("size").is_some());
/// assert!(registry.resolve("blur").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Arc<dyn ImageProcessor>>,
}

impl ProcessorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `size` processor.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("size", Arc::new(SizeProcessor::new()));
        registry
    }

    /// Register a processor under a name, replacing any previous holder.
    pub fn register(&mut self, name: impl Into<String>, processor: Arc<dyn ImageProcessor>) {
        let name = name.into();
        tracing::debug!(%name, "Registered processor");
        self.processors.insert(name, processor);
    }

    /// Resolve a processor by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn ImageProcessor>> {
        self.processors.get(name).cloned()
    }

    /// Names of all registered processors, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.processors.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("processors", &self.names())
            .finish()
    }
}
