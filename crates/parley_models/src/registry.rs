//! Backend lookup table, availability probing and selection.

use crate::{GeminiDriver, OllamaDriver, OpenAiDriver, OpenRouterDriver};
use parley_config::EffectiveConfig;
use parley_core::ProviderKind;
use parley_interface::ChatProvider;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Order tried after the preferred backend.
pub const FALLBACK_ORDER: [ProviderKind; 4] = [
    ProviderKind::Ollama,
    ProviderKind::OpenRouter,
    ProviderKind::Gemini,
    ProviderKind::OpenAi,
];

/// Result of probing every registered backend once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderAvailability(BTreeMap<ProviderKind, bool>);

impl ProviderAvailability {
    /// Empty availability map; every backend reads as unavailable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a probe result.
    pub fn set(&mut self, kind: ProviderKind, available: bool) {
        self.0.insert(kind, available);
    }

    /// Whether `kind` was probed and found usable.
    pub fn is_available(&self, kind: ProviderKind) -> bool {
        self.0.get(&kind).copied().unwrap_or(false)
    }

    /// Backends that probed as usable.
    pub fn available(&self) -> impl Iterator<Item = ProviderKind> + '_ {
        self.0
            .iter()
            .filter(|(_, available)| **available)
            .map(|(kind, _)| *kind)
    }
}

impl FromIterator<(ProviderKind, bool)> for ProviderAvailability {
    fn from_iter<I: IntoIterator<Item = (ProviderKind, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Pick the backend to use for this run.
///
/// Tries `preferred` first, then [`FALLBACK_ORDER`], skipping duplicates.
/// An unrecognised preferred name is logged and ignored.
///
/// # Examples
///
/// ```
/// use parley_core::ProviderKind;
/// use parley_models::{ProviderAvailability, select_provider};
///
/// let availability: ProviderAvailability = [
///     (ProviderKind::Ollama, true),
///     (ProviderKind::Gemini, false),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(select_provider("gemini", &availability), Some(ProviderKind::Ollama));
/// assert_eq!(select_provider("gemini", &ProviderAvailability::new()), None);
/// ```
#[instrument(skip(availability))]
pub fn select_provider(
    preferred: &str,
    availability: &ProviderAvailability,
) -> Option<ProviderKind> {
    let preferred = match ProviderKind::from_str(preferred.trim()) {
        Ok(kind) => Some(kind),
        Err(_) => {
            warn!(preferred, "Unknown preferred provider, using fallback order");
            None
        }
    };

    let mut tried = Vec::with_capacity(FALLBACK_ORDER.len() + 1);
    for kind in preferred.into_iter().chain(FALLBACK_ORDER) {
        if tried.contains(&kind) {
            continue;
        }
        tried.push(kind);
        if availability.is_available(kind) {
            info!(provider = %kind, "Selected provider");
            return Some(kind);
        }
        debug!(provider = %kind, "Provider unavailable");
    }

    warn!("No provider available; NPCs will answer with a canned line");
    None
}

/// One driver per backend, keyed by [`ProviderKind`].
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn ChatProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.kinds())
            .finish()
    }
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard drivers from configuration, sharing one HTTP client.
    #[instrument(skip(config))]
    pub fn from_config(config: &EffectiveConfig) -> Self {
        let client = reqwest::Client::new();
        let turns = *config.history_limit();

        let ollama = config.provider(ProviderKind::Ollama);
        let gemini = config.provider(ProviderKind::Gemini);
        let openai = config.provider(ProviderKind::OpenAi);
        let openrouter = config.provider(ProviderKind::OpenRouter);

        let registry = Self::new()
            .with_provider(Arc::new(
                OllamaDriver::new(client.clone(), ollama.endpoint(), ollama.model())
                    .with_api_key(ollama.api_key().clone())
                    .with_max_turns(turns),
            ))
            .with_provider(Arc::new(
                GeminiDriver::new(
                    client.clone(),
                    gemini.endpoint(),
                    gemini.model(),
                    gemini.api_key().clone(),
                )
                .with_max_turns(turns),
            ))
            .with_provider(Arc::new(
                OpenAiDriver::new(
                    client.clone(),
                    openai.endpoint(),
                    openai.model(),
                    openai.api_key().clone(),
                )
                .with_max_turns(turns),
            ))
            .with_provider(Arc::new(
                OpenRouterDriver::new(
                    client,
                    openrouter.endpoint(),
                    openrouter.model(),
                    openrouter.api_key().clone(),
                )
                .with_max_turns(turns),
            ));

        debug!(providers = ?registry.kinds(), "Built provider registry");
        registry
    }

    /// Register or replace the driver for `provider.kind()`.
    pub fn with_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    /// Driver for `kind`, if registered.
    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ChatProvider>> {
        self.providers.get(&kind).cloned()
    }

    /// Registered backends in a stable order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.providers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Probe every registered backend concurrently.
    #[instrument(skip(self))]
    pub async fn probe_all(&self, probe_timeout: Duration) -> ProviderAvailability {
        let probes = self.providers.iter().map(|(kind, provider)| async move {
            let available = provider.is_available(probe_timeout).await;
            debug!(provider = %kind, available, "Probed provider");
            (*kind, available)
        });

        futures::future::join_all(probes).await.into_iter().collect()
    }
}
