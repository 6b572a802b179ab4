//! Customer satisfaction dashboard core.
//!
//! - [`orchestrator`] drives the remote scoring service one batch at a time,
//!   with cooperative cancellation and progress reporting.
//! - [`metrics`] turns scored records into category counts and an NPS.
//! - [`client`] talks to the scoring service over HTTP.

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod orchestrator;

pub use client::{HttpScoringClient, ScoringService, ServiceConfig};
pub use config::{Config, ConfigError};
pub use error::ServiceError;
pub use metrics::{compute_metrics, MetricsError, NpsRating, SatisfactionMetrics, ScoreSummary};
pub use models::{BatchResult, Category, Record};
pub use orchestrator::{
    cancel_pair, BatchOrchestrator, CancelHandle, CancelSignal, ProgressSink, ProgressUpdate,
    RunOutcome, RunStatus,
};
