//! Language-model backends for the Parley NPC chat extension.
//!
//! Every backend implements [`ChatProvider`](parley_interface::ChatProvider)
//! over plain HTTP with `reqwest`:
//!
//! - [`OllamaDriver`]: local Ollama server, reachability probed over the network
//! - [`GeminiDriver`]: Google Gemini `generateContent`
//! - [`OpenAiDriver`] and [`OpenRouterDriver`]: thin wrappers over the shared
//!   [`OpenAiCompatibleClient`]
//!
//! [`ProviderRegistry`] holds one driver per backend, probes them and picks the
//! backend the worker will use.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;
mod http;
mod ollama;
mod openai;
mod openai_compat;
mod openrouter;
mod prompt;
mod registry;
mod sanitize;

pub use gemini::GeminiDriver;
pub use ollama::OllamaDriver;
pub use openai::OpenAiDriver;
pub use openai_compat::OpenAiCompatibleClient;
pub use openrouter::OpenRouterDriver;
pub use prompt::{DEFAULT_TRANSCRIPT_TURNS, build_transcript, system_instruction};
pub use registry::{FALLBACK_ORDER, ProviderAvailability, ProviderRegistry, select_provider};
pub use sanitize::sanitize_reply;
