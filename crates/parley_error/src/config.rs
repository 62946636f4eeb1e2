//! Settings resolution errors.

/// A layer of settings that could not be read or failed validation.
///
/// Raised while resolving the bundled defaults, the engine's mod config and
/// the local override file. Only a broken bundled layer reaches callers; the
/// other two are logged and skipped.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Config Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// What was wrong, naming the offending key where known
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Record a settings problem at the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use parley_error::ConfigError;
    ///
    /// let err = ConfigError::new("queue_capacity must be at least 1");
    /// assert!(err.to_string().starts_with("Config Error: queue_capacity"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
