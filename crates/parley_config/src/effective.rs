//! The resolved, read-only settings snapshot.

use derive_getters::Getters;
use parley_core::{DEFAULT_PERSONALITIES, Personality, ProviderKind};
use parley_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Connection settings for one backend.
///
/// ```toml
/// [providers.gemini]
/// endpoint = "https://generativelanguage.googleapis.com/v1beta"
/// model = "gemini-1.5-flash"
/// api_key = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
pub struct ProviderSettings {
    /// Base URL of the backend API
    #[serde(default)]
    endpoint: String,

    /// Model identifier
    #[serde(default)]
    model: String,

    /// API key; `credential` is accepted as an alias
    #[serde(default, alias = "credential", skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

impl ProviderSettings {
    /// Create settings without a credential.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
        }
    }

    /// Attach a credential.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The credential, if one is set and not blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Process-wide settings, built once at startup and shared read-only.
///
/// Every field has a serde default so partial layers deserialize cleanly.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct EffectiveConfig {
    /// Master switch for the extension
    #[serde(default = "default_enabled")]
    enabled: bool,

    /// Backend to try first
    #[serde(default = "default_preferred_provider")]
    preferred_provider: String,

    /// Per-backend connection settings keyed by lowercase backend name
    #[serde(default = "default_providers")]
    providers: HashMap<String, ProviderSettings>,

    /// Maximum NPCs alive at once
    #[serde(default = "default_max_npc_count")]
    max_npc_count: usize,

    /// Maximum NPCs owned by one player
    #[serde(default = "default_per_player_npc_cap")]
    per_player_npc_cap: usize,

    /// Maximum horizontal spawn distance from the player
    #[serde(default = "default_spawn_radius")]
    spawn_radius: f64,

    /// Conversation turns retained per NPC
    #[serde(default = "default_history_limit")]
    history_limit: usize,

    /// Budget for one provider call
    #[serde(default = "default_response_timeout_seconds")]
    response_timeout_seconds: u64,

    /// Spawn an NPC when a player joins
    #[serde(default = "default_auto_spawn_on_join")]
    auto_spawn_on_join: bool,

    /// Personality vocabulary; empty means the built-in list
    #[serde(default = "default_personalities")]
    personalities: Vec<String>,

    /// Strip reasoning blocks from replies
    #[serde(default = "default_filter_reasoning")]
    filter_reasoning: bool,

    /// Bounded queue length
    #[serde(default = "default_queue_capacity")]
    queue_capacity: usize,

    /// How long the worker waits on an empty queue before checking for stop
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,

    /// How long shutdown waits for the worker
    #[serde(default = "default_shutdown_timeout_ms")]
    shutdown_timeout_ms: u64,

    /// Bound for the local reachability probe
    #[serde(default = "default_probe_timeout_ms")]
    probe_timeout_ms: u64,

    /// Jobs older than this are dropped; 0 disables the check
    #[serde(default)]
    max_job_age_seconds: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_preferred_provider() -> String {
    ProviderKind::Ollama.to_string()
}

fn default_providers() -> HashMap<String, ProviderSettings> {
    HashMap::from([
        (
            ProviderKind::Ollama.to_string(),
            ProviderSettings::new("http://localhost:11434", "llama3.2"),
        ),
        (
            ProviderKind::Gemini.to_string(),
            ProviderSettings::new(
                "https://generativelanguage.googleapis.com/v1beta",
                "gemini-1.5-flash",
            ),
        ),
        (
            ProviderKind::OpenAi.to_string(),
            ProviderSettings::new("https://api.openai.com/v1", "gpt-4o-mini"),
        ),
        (
            ProviderKind::OpenRouter.to_string(),
            ProviderSettings::new(
                "https://openrouter.ai/api/v1",
                "meta-llama/llama-3.1-8b-instruct",
            ),
        ),
    ])
}

fn default_max_npc_count() -> usize {
    10
}

fn default_per_player_npc_cap() -> usize {
    1
}

fn default_spawn_radius() -> f64 {
    5.0
}

fn default_history_limit() -> usize {
    10
}

fn default_response_timeout_seconds() -> u64 {
    30
}

fn default_auto_spawn_on_join() -> bool {
    true
}

fn default_personalities() -> Vec<String> {
    DEFAULT_PERSONALITIES.iter().map(|p| p.to_string()).collect()
}

fn default_filter_reasoning() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    64
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_shutdown_timeout_ms() -> u64 {
    2000
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            preferred_provider: default_preferred_provider(),
            providers: default_providers(),
            max_npc_count: default_max_npc_count(),
            per_player_npc_cap: default_per_player_npc_cap(),
            spawn_radius: default_spawn_radius(),
            history_limit: default_history_limit(),
            response_timeout_seconds: default_response_timeout_seconds(),
            auto_spawn_on_join: default_auto_spawn_on_join(),
            personalities: default_personalities(),
            filter_reasoning: default_filter_reasoning(),
            queue_capacity: default_queue_capacity(),
            poll_interval_ms: default_poll_interval_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            max_job_age_seconds: 0,
        }
    }
}

impl EffectiveConfig {
    /// Reject values the runtime cannot honour.
    ///
    /// # Errors
    ///
    /// Returns the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::new("queue_capacity must be at least 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::new("poll_interval_ms must be at least 1"));
        }
        if self.response_timeout_seconds == 0 {
            return Err(ConfigError::new(
                "response_timeout_seconds must be at least 1",
            ));
        }
        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return Err(ConfigError::new(format!(
                "spawn_radius must be a non-negative number, got {}",
                self.spawn_radius
            )));
        }
        Ok(())
    }

    /// Settings for a backend; unconfigured backends get empty settings.
    pub fn provider(&self, kind: ProviderKind) -> ProviderSettings {
        let name = kind.as_ref();
        self.providers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, settings)| settings.clone())
            .unwrap_or_default()
    }

    /// Personalities to draw from, falling back to the built-in list.
    pub fn personality_pool(&self) -> Vec<Personality> {
        let configured: Vec<Personality> = self
            .personalities
            .iter()
            .filter(|tag| !tag.trim().is_empty())
            .map(Personality::new)
            .collect();

        if configured.is_empty() {
            DEFAULT_PERSONALITIES.iter().map(Personality::new).collect()
        } else {
            configured
        }
    }

    /// Provider call budget.
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_seconds)
    }

    /// Empty-queue wait before the worker re-checks the stop flag.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Join window used by shutdown.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Bound for reachability probes.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Staleness bound, `None` when disabled.
    pub fn max_job_age(&self) -> Option<Duration> {
        (self.max_job_age_seconds > 0).then(|| Duration::from_secs(self.max_job_age_seconds))
    }
}
