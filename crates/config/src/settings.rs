//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use call_audit_core::AiSettings;

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Batch sweep configuration
    #[serde(default)]
    pub batch: BatchConfig,

    /// AI provider settings; overridable at runtime through the admin surface
    #[serde(default)]
    pub ai: AiSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Batch orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum calls per sweep
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Sleep between calls within a sweep (milliseconds)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_batch_size() -> usize {
    10
}

fn default_delay_ms() -> u64 {
    1_000
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }
        if self.batch.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch.batch_size".to_string(),
                message: "Batch size must be at least 1".to_string(),
            });
        }
        if self.ai.provider.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ai.provider".to_string(),
                message: "Provider name cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (CALL_AUDIT_ prefix)
/// 2. config/{env}.toml (if env specified)
/// 3. config/default.toml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{env_name}")).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("CALL_AUDIT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
