//! Layered resolution: bundled defaults < engine mod config < override file.

use crate::EffectiveConfig;
use config::{Config, File, FileFormat};
use parley_error::{ConfigError, ParleyResult};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Bundled defaults shipped with the crate.
pub const DEFAULT_CONFIG: &str = include_str!("../../../parley.toml");

/// Resolve the effective settings.
///
/// A malformed engine layer is logged and ignored, as is a malformed override
/// file. A missing override file is skipped silently.
///
/// # Errors
///
/// Fails only when the bundled defaults themselves cannot be parsed.
///
/// # Examples
///
/// ```
/// let config = parley_config::resolve(None, None)?;
/// assert_eq!(config.preferred_provider(), "ollama");
/// # Ok::<(), parley_error::ParleyError>(())
/// ```
#[instrument(skip(engine), fields(has_engine = engine.is_some(), override_path = ?override_path))]
pub fn resolve(
    engine: Option<&serde_json::Value>,
    override_path: Option<&Path>,
) -> ParleyResult<EffectiveConfig> {
    let defaults = layered(None, None)?;

    let (base, engine) = match engine {
        Some(value) => match layered(Some(value), None) {
            Ok(config) => (config, Some(value)),
            Err(e) => {
                warn!(error = %e, "Ignoring engine mod config");
                (defaults, None)
            }
        },
        None => (defaults, None),
    };

    let Some(path) = override_path else {
        debug!("No override file configured");
        return Ok(base);
    };

    match layered(engine, Some(path)) {
        Ok(config) => {
            debug!(path = %path.display(), "Applied override file");
            Ok(config)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring malformed override file");
            Ok(base)
        }
    }
}

fn layered(
    engine: Option<&serde_json::Value>,
    override_path: Option<&Path>,
) -> Result<EffectiveConfig, ConfigError> {
    let mut builder =
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

    if let Some(value) = engine {
        if !value.is_object() {
            return Err(ConfigError::new(format!(
                "Engine mod config must be an object, got {}",
                value
            )));
        }
        let engine_layer = Config::try_from(value).map_err(|e| {
            ConfigError::new(format!("Failed to read engine mod config: {}", e))
        })?;
        builder = builder.add_source(engine_layer);
    }

    if let Some(path) = override_path {
        builder = builder.add_source(File::from(path).required(false));
    }

    let config: EffectiveConfig = builder
        .build()
        .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
        .try_deserialize()
        .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

    config.validate()?;
    Ok(config)
}
