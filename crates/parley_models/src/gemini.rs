//! Google Gemini driver.

use crate::http::{join_url, non_empty, send_json};
use crate::prompt::{DEFAULT_TRANSCRIPT_TURNS, build_transcript};
use async_trait::async_trait;
use parley_core::{ChatTurn, NpcContext, ProviderKind, Role};
use parley_error::{ProviderError, ProviderErrorKind, ProviderResult};
use parley_interface::ChatProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Driver for the Gemini `generateContent` API.
///
/// The system framing travels in `systemInstruction`; NPC replies use the
/// `model` role.
#[derive(Debug, Clone)]
pub struct GeminiDriver {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_turns: usize,
}

impl GeminiDriver {
    /// Create a driver; `endpoint` is the API base such as
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            max_turns: DEFAULT_TRANSCRIPT_TURNS,
        }
    }

    /// Limit how many prior turns are replayed.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }
}

#[async_trait]
impl ChatProvider for GeminiDriver {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn is_available(&self, _probe_timeout: Duration) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self, context, history, message), fields(provider = PROVIDER, model = %self.model, npc = %context.npc_id()))]
    async fn generate_response(
        &self,
        context: &NpcContext,
        history: &[ChatTurn],
        message: &str,
        timeout: Duration,
    ) -> ProviderResult<String> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::new(
                PROVIDER,
                ProviderErrorKind::MissingCredential(PROVIDER.to_string()),
            ));
        };

        let transcript = build_transcript(context, history, message, self.max_turns);
        let mut system = Vec::new();
        let mut contents = Vec::new();
        for entry in &transcript {
            let part = Part {
                text: &entry.content,
            };
            match entry.role {
                Role::System => system.push(part),
                Role::User => contents.push(Content {
                    role: Some("user"),
                    parts: vec![part],
                }),
                Role::Assistant => contents.push(Content {
                    role: Some("model"),
                    parts: vec![part],
                }),
            }
        }

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: system,
            },
            contents,
        };

        debug!(turns = body.contents.len(), "Sending generateContent request");
        let url = join_url(&self.endpoint, &format!("models/{}:generateContent", self.model));
        let request = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body);
        let response: GenerateContentResponse = send_json(PROVIDER, request, timeout).await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text);

        non_empty(PROVIDER, text)
    }
}
