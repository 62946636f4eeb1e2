//! Language-model provider errors.

/// Provider-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Transport failure (connection refused, DNS, TLS, reset)
    #[display("Request failed: {}", _0)]
    Http(String),

    /// Backend answered with a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Response body did not match the expected envelope
    #[display("Failed to parse response: {}", _0)]
    Parse(String),

    /// Response parsed but contained no usable text
    #[display("Backend returned an empty reply")]
    EmptyReply,

    /// Hosted backend used without a credential
    #[display("No credential configured for {}", _0)]
    MissingCredential(String),

    /// Call exceeded its time budget and was abandoned
    #[display("Call timed out after {}ms", _0)]
    Timeout(u64),
}

/// Provider error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error ({}): {} at {}:{}", provider, kind, file, line)]
pub struct ProviderError {
    /// Provider that produced the error (e.g. "ollama")
    pub provider: &'static str,
    /// The specific error kind
    pub kind: ProviderErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new provider error.
    ///
    /// # Examples
    ///
    /// ```
    /// use parley_error::{ProviderError, ProviderErrorKind};
    ///
    /// let err = ProviderError::new("gemini", ProviderErrorKind::EmptyReply);
    /// assert_eq!(err.provider, "gemini");
    /// assert!(err.to_string().contains("empty reply"));
    /// ```
    #[track_caller]
    pub fn new(provider: &'static str, kind: ProviderErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            provider,
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Whether the call was abandoned because it ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ProviderErrorKind::Timeout(_))
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
