//! OpenRouter driver.

use crate::openai_compat::OpenAiCompatibleClient;
use async_trait::async_trait;
use parley_core::{ChatTurn, NpcContext, ProviderKind};
use parley_error::ProviderResult;
use parley_interface::ChatProvider;
use reqwest::Client;
use std::time::Duration;

/// Sent as `HTTP-Referer` so OpenRouter can attribute traffic.
pub const APP_REFERER: &str = "https://github.com/crumplecup/parley";

/// Sent as `X-Title`.
pub const APP_TITLE: &str = "Parley NPC Chat";

/// OpenRouter gateway driver. Same protocol as OpenAI plus attribution headers.
#[derive(Debug, Clone)]
pub struct OpenRouterDriver {
    inner: OpenAiCompatibleClient,
}

impl OpenRouterDriver {
    /// Create a driver; `endpoint` is the API base such as `https://openrouter.ai/api/v1`.
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let inner = OpenAiCompatibleClient::new(client, "openrouter", endpoint, model, api_key)
            .with_header("HTTP-Referer", APP_REFERER)
            .with_header("X-Title", APP_TITLE);
        Self { inner }
    }

    /// Limit how many prior turns are replayed.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.inner = self.inner.with_max_turns(max_turns);
        self
    }
}

#[async_trait]
impl ChatProvider for OpenRouterDriver {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenRouter
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn is_available(&self, _probe_timeout: Duration) -> bool {
        self.inner.has_credential()
    }

    async fn generate_response(
        &self,
        context: &NpcContext,
        history: &[ChatTurn],
        message: &str,
        timeout: Duration,
    ) -> ProviderResult<String> {
        self.inner.complete(context, history, message, timeout).await
    }
}
