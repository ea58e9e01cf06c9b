//! Derivative pipeline error types.

/// Kinds of pipeline errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// No original asset registered under the given UUID
    #[display("Asset not found: {}", _0)]
    AssetNotFound(String),
    /// A single-flight slot closed without delivering a result
    #[display("In-flight computation vanished for key: {}", _0)]
    SlotClosed(String),
    /// The spawned transform task failed to run to completion
    #[display("Transform task failed: {}", _0)]
    TaskFailed(String),
}

/// Pipeline error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
