//! Scoring service connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for the remote scoring service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the scoring service API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Deadline for fetching the full record set (seconds)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Deadline for one "score next batch" call (seconds).
    /// Scoring runs an LLM per record, so this is generous.
    #[serde(default = "default_score_timeout_secs")]
    pub score_timeout_secs: u64,
    /// Deadline for establishing a connection (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_score_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl ServiceConfig {
    /// Base default without env overrides.
    pub fn base_default() -> Self {
        Self {
            endpoint: default_endpoint(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            score_timeout_secs: default_score_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `NPS_ENDPOINT`: base URL of the scoring service
    /// - `NPS_FETCH_TIMEOUT`: record fetch deadline in seconds
    /// - `NPS_SCORE_TIMEOUT`: batch scoring deadline in seconds
    /// - `NPS_CONNECT_TIMEOUT`: connect deadline in seconds
    ///
    /// Unparseable numeric values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("NPS_ENDPOINT") {
            self.endpoint = val;
        }
        if let Some(secs) = env_secs("NPS_FETCH_TIMEOUT") {
            self.fetch_timeout_secs = secs;
        }
        if let Some(secs) = env_secs("NPS_SCORE_TIMEOUT") {
            self.score_timeout_secs = secs;
        }
        if let Some(secs) = env_secs("NPS_CONNECT_TIMEOUT") {
            self.connect_timeout_secs = secs;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn score_timeout(&self) -> Duration {
        Duration::from_secs(self.score_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Join an API path onto the endpoint.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}

fn env_secs(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
