//! Local Ollama server driver.

use crate::http::{join_url, non_empty, send_json};
use crate::prompt::{DEFAULT_TRANSCRIPT_TURNS, build_transcript};
use async_trait::async_trait;
use parley_core::{ChatTurn, Message, NpcContext, ProviderKind, Role};
use parley_error::ProviderResult;
use parley_interface::ChatProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "ollama";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Driver for a locally hosted Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaDriver {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_turns: usize,
}

impl OllamaDriver {
    /// Create a driver for the server at `endpoint` (e.g. `http://localhost:11434`).
    pub fn new(client: Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
            max_turns: DEFAULT_TRANSCRIPT_TURNS,
        }
    }

    /// Send a bearer token, for servers behind an authenticating proxy.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    /// Limit how many prior turns are replayed.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl ChatProvider for OllamaDriver {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn is_available(&self, probe_timeout: Duration) -> bool {
        let request = self
            .client
            .get(join_url(&self.endpoint, "api/tags"))
            .timeout(probe_timeout);

        match self.authorized(request).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(status = %response.status(), "Ollama probe rejected");
                false
            }
            Err(e) => {
                debug!(error = %e, "Ollama unreachable");
                false
            }
        }
    }

    #[instrument(skip(self, context, history, message), fields(provider = PROVIDER, model = %self.model, npc = %context.npc_id()))]
    async fn generate_response(
        &self,
        context: &NpcContext,
        history: &[ChatTurn],
        message: &str,
        timeout: Duration,
    ) -> ProviderResult<String> {
        let transcript: Vec<Message> = build_transcript(context, history, message, self.max_turns);
        let body = ChatRequest {
            model: &self.model,
            messages: transcript
                .iter()
                .map(|m| WireMessage {
                    role: wire_role(m.role),
                    content: &m.content,
                })
                .collect(),
            stream: false,
        };

        debug!(messages = body.messages.len(), "Sending chat request to Ollama");
        let request = self
            .client
            .post(join_url(&self.endpoint, "api/chat"))
            .json(&body);
        let response: ChatResponse = send_json(PROVIDER, self.authorized(request), timeout).await?;

        non_empty(PROVIDER, response.message.map(|m| m.content))
    }
}
