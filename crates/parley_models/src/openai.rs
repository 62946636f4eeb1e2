//! OpenAI driver.

use crate::openai_compat::OpenAiCompatibleClient;
use async_trait::async_trait;
use parley_core::{ChatTurn, NpcContext, ProviderKind};
use parley_error::ProviderResult;
use parley_interface::ChatProvider;
use reqwest::Client;
use std::time::Duration;

/// OpenAI chat completions driver.
#[derive(Debug, Clone)]
pub struct OpenAiDriver {
    inner: OpenAiCompatibleClient,
}

impl OpenAiDriver {
    /// Create a driver; `endpoint` is the API base such as `https://api.openai.com/v1`.
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            inner: OpenAiCompatibleClient::new(client, "openai", endpoint, model, api_key),
        }
    }

    /// Limit how many prior turns are replayed.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.inner = self.inner.with_max_turns(max_turns);
        self
    }
}

#[async_trait]
impl ChatProvider for OpenAiDriver {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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
