//! The language-model backend capability.

use async_trait::async_trait;
use parley_core::{ChatTurn, NpcContext, ProviderKind};
use parley_error::ProviderResult;
use std::time::Duration;

/// Core trait that every language-model backend implements.
///
/// Backends differ only in transport details (endpoint shape, auth header,
/// response envelope). They are selected once at startup from a lookup table
/// and invoked only from the background worker.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> ProviderKind;

    /// Model identifier (e.g., "llama3.2", "gpt-4o-mini").
    fn model_name(&self) -> &str;

    /// Whether the backend can be used right now.
    ///
    /// Local backends perform a lightweight reachability call bounded by
    /// `probe_timeout`; hosted backends only check that a credential is
    /// configured.
    async fn is_available(&self, probe_timeout: Duration) -> bool;

    /// Produce the NPC's reply to `message`.
    ///
    /// `history` holds prior turns oldest first. `timeout` bounds the whole
    /// HTTP exchange.
    async fn generate_response(
        &self,
        context: &NpcContext,
        history: &[ChatTurn],
        message: &str,
        timeout: Duration,
    ) -> ProviderResult<String>;
}
