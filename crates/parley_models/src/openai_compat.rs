//! Client for OpenAI-style `chat/completions` endpoints.

use crate::http::{join_url, non_empty, send_json};
use crate::prompt::{DEFAULT_TRANSCRIPT_TURNS, build_transcript};
use parley_core::{ChatTurn, NpcContext, Role};
use parley_error::{ProviderError, ProviderErrorKind, ProviderResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Shared transport for backends that speak the OpenAI chat completions
/// protocol. Backends differ only in base URL and extra headers.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    provider: &'static str,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    headers: Vec<(&'static str, String)>,
    max_turns: usize,
}

impl OpenAiCompatibleClient {
    /// Create a client. `provider` tags logs and errors.
    pub fn new(
        client: Client,
        provider: &'static str,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            provider,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            headers: Vec::new(),
            max_turns: DEFAULT_TRANSCRIPT_TURNS,
        }
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Limit how many prior turns are replayed.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Provider tag.
    pub fn provider_name(&self) -> &'static str {
        self.provider
    }

    /// Model identifier.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Whether a credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send the transcript and return the first choice's text.
    #[instrument(skip(self, context, history, message), fields(provider = self.provider, model = %self.model))]
    pub async fn complete(
        &self,
        context: &NpcContext,
        history: &[ChatTurn],
        message: &str,
        timeout: Duration,
    ) -> ProviderResult<String> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::new(
                self.provider,
                ProviderErrorKind::MissingCredential(self.provider.to_string()),
            ));
        };

        let transcript = build_transcript(context, history, message, self.max_turns);
        let body = CompletionRequest {
            model: &self.model,
            messages: transcript
                .iter()
                .map(|m| CompletionMessage {
                    role: match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    content: &m.content,
                })
                .collect(),
        };

        debug!(messages = body.messages.len(), "Sending chat completion request");
        let mut request = self
            .client
            .post(join_url(&self.endpoint, "chat/completions"))
            .bearer_auth(api_key)
            .json(&body);
        for (name, value) in &self.headers {
            request = request.header(*name, value);
        }

        let response: CompletionResponse = send_json(self.provider, request, timeout).await?;
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        non_empty(self.provider, text)
    }
}
