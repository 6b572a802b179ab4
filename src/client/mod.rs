//! Client for the remote sentiment-scoring service.
//!
//! The service owns record state. It exposes the full record set and an
//! endpoint that scores the next N unscored records with an LLM.

mod config;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::ServiceError;
use crate::models::{BatchResult, Record};

pub use config::ServiceConfig;

const RECORDS_PATH: &str = "/api/avaliacoes";
const SCORE_BATCH_PATH: &str = "/api/processar_avaliacoes";

/// Operations the orchestrator needs from the scoring service.
#[async_trait]
pub trait ScoringService: Send + Sync {
    /// Fetch every record, scored or not.
    async fn fetch_all_records(&self) -> Result<Vec<Record>, ServiceError>;

    /// Ask the service to score up to `limit` unscored records.
    async fn score_next_batch(&self, limit: NonZeroU32) -> Result<BatchResult, ServiceError>;
}

#[async_trait]
impl<S: ScoringService + ?Sized> ScoringService for Arc<S> {
    async fn fetch_all_records(&self) -> Result<Vec<Record>, ServiceError> {
        (**self).fetch_all_records().await
    }

    async fn score_next_batch(&self, limit: NonZeroU32) -> Result<BatchResult, ServiceError> {
        (**self).score_next_batch(limit).await
    }
}

/// HTTP implementation of [`ScoringService`].
pub struct HttpScoringClient {
    config: ServiceConfig,
    client: Client,
}

impl HttpScoringClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ServiceError::ServiceError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Get the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn transport_error(&self, err: reqwest::Error, timeout: Duration) -> ServiceError {
        if err.is_timeout() {
            // A connect timeout also reports is_timeout
            if err.is_connect() {
                ServiceError::Timeout(self.config.connect_timeout())
            } else {
                ServiceError::Timeout(timeout)
            }
        } else if err.is_decode() {
            ServiceError::ServiceError(format!("malformed response: {err}"))
        } else {
            ServiceError::ServiceUnavailable {
                endpoint: self.config.endpoint.clone(),
                message: err.to_string(),
            }
        }
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(ServiceError::ServiceError(format!("HTTP {}: {}", status, body)))
    }
}

#[async_trait]
impl ScoringService for HttpScoringClient {
    async fn fetch_all_records(&self) -> Result<Vec<Record>, ServiceError> {
        let timeout = self.config.fetch_timeout();
        let url = self.config.url(RECORDS_PATH);
        debug!(%url, "fetching records");

        let resp = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e, timeout))?;
        let resp = Self::check_status(resp).await?;

        let records: Vec<Record> = resp
            .json()
            .await
            .map_err(|e| self.transport_error(e, timeout))?;
        debug!(count = records.len(), "fetched records");
        Ok(records)
    }

    async fn score_next_batch(&self, limit: NonZeroU32) -> Result<BatchResult, ServiceError> {
        let timeout = self.config.score_timeout();
        let url = self.config.url(SCORE_BATCH_PATH);
        debug!(%url, limit = limit.get(), "requesting batch scoring");

        let resp = self
            .client
            .post(&url)
            .query(&[("limit", limit.get())])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e, timeout))?;
        let resp = Self::check_status(resp).await?;

        resp.json()
            .await
            .map_err(|e| self.transport_error(e, timeout))
    }
}
