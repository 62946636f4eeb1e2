//! Tracing subscriber setup for embedders and the console harness.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console tracing.
///
/// Respects `RUST_LOG`; falls back to `default_directives` (for example
/// `"info,parley=debug"`) when it is unset or invalid.
///
/// # Errors
///
/// Returns error if a global subscriber is already installed.
pub fn init_telemetry(default_directives: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .try_init()?;

    Ok(())
}
