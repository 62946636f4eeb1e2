//! Background worker errors.

/// Worker lifecycle failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum WorkerErrorKind {
    /// OS refused to start the worker thread
    #[display("Failed to spawn worker thread: {}", _0)]
    Spawn(String),

    /// Worker could not build its async runtime
    #[display("Failed to build worker runtime: {}", _0)]
    Runtime(String),

    /// Worker never reported its provider selection
    #[display("Worker did not finish startup within {}ms", _0)]
    StartupTimeout(u64),
}

/// Worker error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Worker Error: {} at line {} in {}", kind, line, file)]
pub struct WorkerError {
    /// The error kind
    pub kind: WorkerErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl WorkerError {
    /// Create a new WorkerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: WorkerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
