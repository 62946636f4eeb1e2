//! Language-model backend identifiers.

use serde::{Deserialize, Serialize};

/// The backends Parley knows how to talk to.
///
/// String forms are lowercase and parsing ignores ASCII case.
///
/// # Examples
///
/// ```
/// use parley_core::ProviderKind;
/// use std::str::FromStr;
///
/// assert_eq!(ProviderKind::OpenRouter.to_string(), "openrouter");
/// assert_eq!(ProviderKind::from_str("Gemini").unwrap(), ProviderKind::Gemini);
/// assert!(ProviderKind::from_str("llamafile").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    /// Locally hosted Ollama server
    Ollama,
    /// Google Gemini
    Gemini,
    /// OpenAI chat completions
    OpenAi,
    /// OpenRouter (OpenAI-compatible gateway)
    OpenRouter,
}

impl ProviderKind {
    /// Hosted backends are only usable with a credential.
    pub fn requires_credential(&self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}
