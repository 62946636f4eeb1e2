//! Worker tunables in runtime units.

use derive_getters::Getters;
use parley_config::EffectiveConfig;
use std::time::Duration;

/// What the queue and worker need from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct DispatchSettings {
    /// Bounded queue length
    queue_capacity: usize,
    /// Turns kept per NPC
    history_limit: usize,
    /// Budget for one provider call
    response_timeout: Duration,
    /// Wait on an empty queue before re-checking the stop signal
    poll_interval: Duration,
    /// Drop jobs older than this
    max_job_age: Option<Duration>,
    /// Strip reasoning from replies
    filter_reasoning: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&EffectiveConfig::default())
    }
}

impl From<&EffectiveConfig> for DispatchSettings {
    fn from(config: &EffectiveConfig) -> Self {
        Self {
            queue_capacity: (*config.queue_capacity()).max(1),
            history_limit: *config.history_limit(),
            response_timeout: config.response_timeout(),
            poll_interval: config.poll_interval(),
            max_job_age: config.max_job_age(),
            filter_reasoning: *config.filter_reasoning(),
        }
    }
}
