//! Error types shared by the scoring client and the orchestrator.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single call to the scoring service.
///
/// None of these are retried internally; the caller decides whether to
/// start another run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Connection to the service could not be established.
    #[error("scoring service unavailable at {endpoint}: {message}")]
    ServiceUnavailable { endpoint: String, message: String },
    /// The call exceeded its deadline.
    #[error("scoring service call timed out after {0:?}")]
    Timeout(Duration),
    /// Transport succeeded but the service reported a failure
    /// (non-success status or a payload we could not decode).
    #[error("scoring service error: {0}")]
    ServiceError(String),
    /// A batch scored nothing while the service still reported pending work.
    /// Raised locally by the orchestrator, not by the service.
    #[error("scoring stalled: batch scored nothing but {remaining} records remain pending")]
    Stalled { remaining: u64 },
}

impl ServiceError {
    /// Whether re-invoking the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ServiceError::ServiceUnavailable { .. } | ServiceError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ServiceError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(ServiceError::ServiceUnavailable {
            endpoint: "http://localhost:8000".to_string(),
            message: "connection refused".to_string(),
        }
        .is_transient());
        assert!(!ServiceError::ServiceError("HTTP 500".to_string()).is_transient());
        assert!(!ServiceError::Stalled { remaining: 3 }.is_transient());
    }

    #[test]
    fn test_display_includes_endpoint() {
        let err = ServiceError::ServiceUnavailable {
            endpoint: "http://scoring:8000".to_string(),
            message: "refused".to_string(),
        };
        assert!(err.to_string().contains("http://scoring:8000"));
    }
}
