//! Configuration management using the prefer crate for file discovery.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::client::ServiceConfig;

/// Name used for config file discovery (`nps-dashboard.toml`, `.json`, ...).
pub const CONFIG_NAME: &str = "nps-dashboard";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Batch scoring settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Records the service is asked to score per call
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

fn default_batch_size() -> u32 {
    1
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
        .with_env_overrides()
    }
}

impl ScoringConfig {
    /// Apply `NPS_BATCH_SIZE` if set. Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = std::env::var("NPS_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.batch_size = n;
        }
        self
    }
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scoring service connection.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Batch scoring behaviour.
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, auto-discovering a config file in standard
    /// locations. Falls back to defaults (with env overrides) if none is found.
    pub async fn load() -> Result<Self, ConfigError> {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default()),
            },
            Err(_) => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file path.
    /// Format is chosen by extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_err = |message: String| ConfigError::Parse {
            path: path.clone(),
            message,
        };

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_err(e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
        };

        // Environment wins over file values
        config.service = config.service.with_env_overrides();
        config.scoring = config.scoring.with_env_overrides();
        config.source_path = Some(path);
        debug!(path = ?config.source_path, "loaded config file");
        Ok(config)
    }

    /// Check values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scoring.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "scoring.batch_size must be at least 1".to_string(),
            ));
        }
        if self.service.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "service.endpoint must not be empty".to_string(),
            ));
        }
        for (name, secs) in [
            ("service.fetch_timeout_secs", self.service.fetch_timeout_secs),
            ("service.score_timeout_secs", self.service.score_timeout_secs),
            ("service.connect_timeout_secs", self.service.connect_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }

    /// Configured batch size as a non-zero value.
    pub fn batch_size(&self) -> Result<NonZeroU32, ConfigError> {
        NonZeroU32::new(self.scoring.batch_size).ok_or_else(|| {
            ConfigError::Invalid("scoring.batch_size must be at least 1".to_string())
        })
    }
}
