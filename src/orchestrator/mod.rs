//! Batch scoring orchestrator.
//!
//! Drives the scoring service to convergence one bounded batch at a time.
//! Calls are strictly sequential. Each run moves through
//! `Idle -> Running -> {Completed, Interrupted, Failed, NoWorkNeeded}` and
//! keeps no state once it returns.

mod cancel;
mod progress;

use std::num::NonZeroU32;

use tracing::{debug, info, warn};

use crate::client::ScoringService;
use crate::error::ServiceError;
use crate::metrics::pending_count;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use progress::{FnSink, NoProgress, ProgressSink, ProgressUpdate};

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// The service reported completion, or every pending record was processed.
    Completed,
    /// Cancellation was observed before completion.
    Interrupted,
    /// Nothing was pending when the run started.
    NoWorkNeeded,
    /// A service call failed; carries the cause.
    Failed(ServiceError),
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::NoWorkNeeded => "no_work_needed",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What a run achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Records scored during this run, including work done before a failure.
    pub processed_so_far: u64,
    /// Unscored records counted before the first call.
    pub total_pending_at_start: u64,
}

impl RunOutcome {
    fn without_work(status: RunStatus) -> Self {
        Self {
            status,
            processed_so_far: 0,
            total_pending_at_start: 0,
        }
    }
}

/// Counters of a run in progress. Discarded when the run returns.
struct RunState {
    total_pending_at_start: u64,
    processed_so_far: u64,
    batches: u64,
}

impl RunState {
    fn new(total_pending_at_start: u64) -> Self {
        Self {
            total_pending_at_start,
            processed_so_far: 0,
            batches: 0,
        }
    }

    fn snapshot(&self, remaining: u64) -> ProgressUpdate {
        ProgressUpdate {
            processed_so_far: self.processed_so_far,
            total_pending_at_start: self.total_pending_at_start,
            remaining,
        }
    }

    fn finish(self, status: RunStatus) -> RunOutcome {
        match &status {
            RunStatus::Failed(err) => warn!(
                processed = self.processed_so_far,
                total = self.total_pending_at_start,
                batches = self.batches,
                error = %err,
                "scoring run failed"
            ),
            _ => info!(
                status = status.as_str(),
                processed = self.processed_so_far,
                total = self.total_pending_at_start,
                batches = self.batches,
                "scoring run finished"
            ),
        }
        RunOutcome {
            status,
            processed_so_far: self.processed_so_far,
            total_pending_at_start: self.total_pending_at_start,
        }
    }
}

/// Runs scoring batches against a [`ScoringService`].
pub struct BatchOrchestrator<S> {
    service: S,
}

impl<S: ScoringService> BatchOrchestrator<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Score pending records in batches of `batch_size` until the service
    /// reports completion, the pending snapshot is exhausted, `cancel` is
    /// raised, or a call fails.
    ///
    /// `cancel` is checked once per batch, after the call returns.
    pub async fn run(
        &self,
        batch_size: NonZeroU32,
        cancel: &CancelSignal,
        progress: &dyn ProgressSink,
    ) -> RunOutcome {
        let records = match self.service.fetch_all_records().await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "could not fetch records before scoring");
                return RunOutcome::without_work(RunStatus::Failed(err));
            }
        };

        let total = pending_count(&records);
        if total == 0 {
            info!(records = records.len(), "no records pending, nothing to score");
            return RunOutcome::without_work(RunStatus::NoWorkNeeded);
        }

        let mut state = RunState::new(total);
        if cancel.is_cancelled() {
            return state.finish(RunStatus::Interrupted);
        }

        info!(
            pending = total,
            batch_size = batch_size.get(),
            "starting scoring run"
        );

        while state.processed_so_far < state.total_pending_at_start {
            let result = match self.service.score_next_batch(batch_size).await {
                Ok(result) => result,
                Err(err) => return state.finish(RunStatus::Failed(err)),
            };
            state.batches += 1;
            state.processed_so_far = state.processed_so_far.saturating_add(result.processed_count);

            debug!(
                batch = state.batches,
                processed = result.processed_count,
                remaining = result.remaining_pending_count,
                complete = result.is_complete,
                "batch scored"
            );
            progress.report(state.snapshot(result.remaining_pending_count));

            // The service's flag wins even if our arithmetic disagrees
            // (other writers may score or add records concurrently).
            if result.is_complete {
                return state.finish(RunStatus::Completed);
            }

            if cancel.is_cancelled() {
                return state.finish(RunStatus::Interrupted);
            }

            if result.processed_count == 0 {
                let err = ServiceError::Stalled {
                    remaining: result.remaining_pending_count,
                };
                return state.finish(RunStatus::Failed(err));
            }
        }

        state.finish(RunStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::models::{BatchResult, Record};

    /// Fake service replaying scripted batch results.
    struct ScriptedService {
        records: Result<Vec<Record>, ServiceError>,
        script: Mutex<VecDeque<Result<BatchResult, ServiceError>>>,
        calls: AtomicUsize,
        requested_limits: Mutex<Vec<u32>>,
        /// Raise cancellation while serving this (1-based) call.
        cancel_during_call: Option<(usize, CancelHandle)>,
    }

    impl ScriptedService {
        fn new(pending: usize, script: Vec<Result<BatchResult, ServiceError>>) -> Self {
            let mut records: Vec<Record> = (0..pending)
                .map(|i| Record::pending(i as i64, format!("pending {i}")))
                .collect();
            records.push(Record::scored(10_000, "already scored", 10.0));
            Self {
                records: Ok(records),
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
                requested_limits: Mutex::new(Vec::new()),
                cancel_during_call: None,
            }
        }

        fn cancelling_on(mut self, call: usize, handle: CancelHandle) -> Self {
            self.cancel_during_call = Some((call, handle));
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScoringService for ScriptedService {
        async fn fetch_all_records(&self) -> Result<Vec<Record>, ServiceError> {
            self.records.clone()
        }

        async fn score_next_batch(&self, limit: NonZeroU32) -> Result<BatchResult, ServiceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.requested_limits.lock().unwrap().push(limit.get());
            if let Some((on_call, handle)) = &self.cancel_during_call {
                if *on_call == call {
                    handle.cancel();
                }
            }
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::ServiceError("unexpected call".to_string())))
        }
    }

    fn batch(processed: u64, remaining: u64) -> Result<BatchResult, ServiceError> {
        Ok(BatchResult::new(processed, remaining))
    }

    fn size(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_no_pending_records_makes_no_calls() {
        let orchestrator = BatchOrchestrator::new(Arc::new(ScriptedService::new(0, vec![])));
        let outcome = orchestrator
            .run(size(5), &CancelSignal::never(), &NoProgress)
            .await;

        assert_eq!(outcome.status, RunStatus::NoWorkNeeded);
        assert_eq!(outcome.processed_so_far, 0);
        assert_eq!(outcome.total_pending_at_start, 0);
        assert_eq!(orchestrator.service().calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_after_first_of_three_batches() {
        let (handle, signal) = cancel_pair();
        let service = ScriptedService::new(3, vec![batch(1, 2), batch(1, 1), batch(1, 0)])
            .cancelling_on(1, handle);
        let orchestrator = BatchOrchestrator::new(Arc::new(service));

        let outcome = orchestrator.run(size(1), &signal, &NoProgress).await;

        assert_eq!(outcome.status, RunStatus::Interrupted);
        assert_eq!(outcome.processed_so_far, 1);
        assert_eq!(outcome.total_pending_at_start, 3);
        assert_eq!(orchestrator.service().calls(), 1);
    }

    #[tokio::test]
    async fn test_cancel_before_run_makes_no_scoring_calls() {
        let (handle, signal) = cancel_pair();
        handle.cancel();
        let orchestrator = BatchOrchestrator::new(Arc::new(ScriptedService::new(
            2,
            vec![batch(1, 1), batch(1, 0)],
        )));

        let outcome = orchestrator.run(size(1), &signal, &NoProgress).await;

        assert_eq!(outcome.status, RunStatus::Interrupted);
        assert_eq!(outcome.processed_so_far, 0);
        assert_eq!(outcome.total_pending_at_start, 2);
        assert_eq!(orchestrator.service().calls(), 0);
    }

    #[tokio::test]
    async fn test_service_completion_flag_is_authoritative() {
        let orchestrator = BatchOrchestrator::new(Arc::new(ScriptedService::new(
            10,
            vec![batch(2, 0), batch(2, 0)],
        )));

        let outcome = orchestrator
            .run(size(2), &CancelSignal::never(), &NoProgress)
            .await;

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.processed_so_far, 2);
        assert_eq!(outcome.total_pending_at_start, 10);
        assert_eq!(orchestrator.service().calls(), 1);
    }

    #[tokio::test]
    async fn test_completion_flag_wins_over_cancel() {
        let (handle, signal) = cancel_pair();
        let service = ScriptedService::new(1, vec![batch(1, 0)]).cancelling_on(1, handle);
        let orchestrator = BatchOrchestrator::new(Arc::new(service));

        let outcome = orchestrator.run(size(1), &signal, &NoProgress).await;

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.processed_so_far, 1);
    }

    #[tokio::test]
    async fn test_failure_on_second_of_three_preserves_progress() {
        let timeout = ServiceError::Timeout(Duration::from_secs(120));
        let orchestrator = BatchOrchestrator::new(Arc::new(ScriptedService::new(
            6,
            vec![batch(2, 4), Err(timeout.clone()), batch(2, 0)],
        )));

        let outcome = orchestrator
            .run(size(2), &CancelSignal::never(), &NoProgress)
            .await;

        assert_eq!(outcome.status, RunStatus::Failed(timeout));
        assert_eq!(outcome.processed_so_far, 2);
        assert_eq!(outcome.total_pending_at_start, 6);
        assert_eq!(orchestrator.service().calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported_as_failed() {
        let mut service = ScriptedService::new(0, vec![batch(1, 0)]);
        let unavailable = ServiceError::ServiceUnavailable {
            endpoint: "http://localhost:8000".to_string(),
            message: "connection refused".to_string(),
        };
        service.records = Err(unavailable.clone());
        let orchestrator = BatchOrchestrator::new(Arc::new(service));

        let outcome = orchestrator
            .run(size(1), &CancelSignal::never(), &NoProgress)
            .await;

        assert_eq!(outcome.status, RunStatus::Failed(unavailable));
        assert_eq!(outcome.processed_so_far, 0);
        assert_eq!(orchestrator.service().calls(), 0);
    }

    #[tokio::test]
    async fn test_hundred_records_one_at_a_time() {
        let script = (0..100).rev().map(|remaining| batch(1, remaining)).collect();
        let orchestrator = BatchOrchestrator::new(Arc::new(ScriptedService::new(100, script)));
        let (tx, mut rx) = mpsc::unbounded_channel::<ProgressUpdate>();

        let outcome = orchestrator.run(size(1), &CancelSignal::never(), &tx).await;

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.processed_so_far, 100);
        assert_eq!(outcome.total_pending_at_start, 100);
        assert_eq!(orchestrator.service().calls(), 100);
        assert!(orchestrator
            .service()
            .requested_limits
            .lock()
            .unwrap()
            .iter()
            .all(|&limit| limit == 1));

        drop(tx);
        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            updates.push(update);
        }
        assert_eq!(updates.len(), 100);
        assert_eq!(updates[0].processed_so_far, 1);
        assert_eq!(updates[0].remaining, 99);
        assert_eq!(
            updates[99],
            ProgressUpdate {
                processed_so_far: 100,
                total_pending_at_start: 100,
                remaining: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_local_count_reached_without_flag_completes() {
        let orchestrator = BatchOrchestrator::new(Arc::new(ScriptedService::new(
            4,
            vec![batch(2, 3), Ok(BatchResult {
                processed_count: 2,
                remaining_pending_count: 1,
                is_complete: false,
            })],
        )));

        let outcome = orchestrator
            .run(size(2), &CancelSignal::never(), &NoProgress)
            .await;

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.processed_so_far, 4);
        assert_eq!(orchestrator.service().calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_progress_batch_fails_instead_of_looping() {
        let orchestrator = BatchOrchestrator::new(Arc::new(ScriptedService::new(
            3,
            vec![batch(1, 2), batch(0, 2), batch(1, 1)],
        )));

        let outcome = orchestrator
            .run(size(1), &CancelSignal::never(), &NoProgress)
            .await;

        assert_eq!(
            outcome.status,
            RunStatus::Failed(ServiceError::Stalled { remaining: 2 })
        );
        assert_eq!(outcome.processed_so_far, 1);
        assert_eq!(orchestrator.service().calls(), 2);
    }

    #[tokio::test]
    async fn test_full_progress_channel_does_not_stall_run() {
        let script = vec![batch(1, 4), batch(1, 3), batch(1, 2), batch(1, 1), batch(1, 0)];
        let orchestrator = BatchOrchestrator::new(Arc::new(ScriptedService::new(5, script)));
        let (tx, _rx) = mpsc::channel::<ProgressUpdate>(1);

        let outcome = orchestrator.run(size(1), &CancelSignal::never(), &tx).await;

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.processed_so_far, 5);
    }
}
