use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{KeyboxError, Result};

/// Environment variable that disables attestation rewriting when set to `1` or `true`.
pub const DISABLE_REWRITE_ENV: &str = "KEYBOX_DISABLE_ATTESTATION_REWRITE";

/// Rewrite configuration
///
/// Read once per invocation and passed explicitly into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Skip rewriting entirely and pass every response through unchanged
    pub disable_attestation_rewrite: bool,

    /// Log level used by front-ends when `RUST_LOG` is not set
    pub log_level: LogLevel,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            disable_attestation_rewrite: false,
            log_level: LogLevel::Warn,
        }
    }
}

impl RewriteConfig {
    /// Configuration with rewriting disabled.
    pub fn disabled() -> Self {
        Self {
            disable_attestation_rewrite: true,
            ..Self::default()
        }
    }

    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        let disable_attestation_rewrite = std::env::var(DISABLE_REWRITE_ENV)
            .map(|v| flag_enabled(&v))
            .unwrap_or(false);

        Self {
            disable_attestation_rewrite,
            ..Self::default()
        }
    }

    /// Load configuration from a YAML or JSON file.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            KeyboxError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            serde_json::from_str(&data)?
        } else {
            serde_yaml::from_str(&data)?
        };
        Ok(config)
    }
}

fn flag_enabled(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
