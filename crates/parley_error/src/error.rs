//! Top-level error wrapper types.

use crate::{ConfigError, ProviderError, StoreError, WorkerError};

/// Every error condition the workspace can surface.
///
/// # Examples
///
/// ```
/// use parley_error::{ParleyError, ParleyErrorKind, WorkerError, WorkerErrorKind};
///
/// let err: ParleyError = WorkerError::new(WorkerErrorKind::StartupTimeout(3000)).into();
/// assert!(matches!(err.kind(), ParleyErrorKind::Worker(_)));
/// assert!(format!("{}", err).contains("3000ms"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ParleyErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Language-model provider error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// NPC store error
    #[from(StoreError)]
    Store(StoreError),
    /// Background worker error
    #[from(WorkerError)]
    Worker(WorkerError),
}

/// Parley error with kind discrimination.
///
/// # Examples
///
/// ```
/// use parley_error::{ParleyResult, ConfigError};
///
/// fn might_fail() -> ParleyResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Parley Error: {}", _0)]
pub struct ParleyError(Box<ParleyErrorKind>);

impl ParleyError {
    /// Create a new error from a kind.
    pub fn new(kind: ParleyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ParleyErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ParleyErrorKind
impl<T> From<T> for ParleyError
where
    T: Into<ParleyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Parley operations.
pub type ParleyResult<T> = std::result::Result<T, ParleyError>;
