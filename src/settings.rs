//! Runtime settings for the benchmark executor and the HTTP invoker.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::BenchError;

/// Settings loaded from `settings.toml`. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchSettings {
    /// Upper bound on a single invocation; exceeding it fails the pair.
    pub invocation_timeout_secs: u64,
    /// Pairs in flight at once. 1 means strictly sequential.
    pub max_concurrency: usize,
    /// Pause between sequential pairs, for rate-limited services.
    pub pair_delay_ms: u64,
    /// Invocation service endpoint used by `HttpInvoker`.
    pub endpoint: Option<Url>,
    /// Name of the environment variable holding a bearer token.
    pub api_key_env: Option<String>,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            invocation_timeout_secs: 60,
            max_concurrency: 1,
            pair_delay_ms: 0,
            endpoint: None,
            api_key_env: None,
        }
    }
}

impl BenchSettings {
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.invocation_timeout_secs == 0 {
            return Err(BenchError::Config(
                "invocation_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(BenchError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.invocation_timeout_secs)
    }

    pub fn pair_delay(&self) -> Duration {
        Duration::from_millis(self.pair_delay_ms)
    }

    /// Resolve the bearer token from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        let var = self.api_key_env.as_deref()?;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Some(key),
            _ => {
                warn!("API key variable {} is not set", var);
                None
            }
        }
    }
}

/// Parse and validate settings from TOML text.
pub fn parse_settings(content: &str) -> Result<BenchSettings> {
    let settings: BenchSettings = toml::from_str(content).context("Invalid settings TOML")?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<BenchSettings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {:?}", path))?;
    let settings = parse_settings(&content)?;
    info!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// `<config dir>/modelbench/settings.toml`, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("modelbench").join("settings.toml"))
}

/// Load settings from `path`, or defaults when no file exists there.
pub fn load_settings_or_default(path: &Path) -> Result<BenchSettings> {
    if path.exists() {
        load_settings(path)
    } else {
        debug!("No settings file at {:?}, using defaults", path);
        Ok(BenchSettings::default())
    }
}

/// Load settings from the default location, falling back to defaults when
/// no file exists there.
pub fn load_default_settings() -> Result<BenchSettings> {
    match default_settings_path() {
        Some(path) => load_settings_or_default(&path),
        None => Ok(BenchSettings::default()),
    }
}
