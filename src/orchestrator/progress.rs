//! Progress reporting for scoring runs.
//!
//! Sinks are fire-and-forget: a slow, full, or closed sink drops updates
//! rather than stalling the run.

use serde::Serialize;
use tokio::sync::mpsc;

/// Immutable snapshot emitted once per completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub processed_so_far: u64,
    pub total_pending_at_start: u64,
    /// Unscored records left according to the service.
    pub remaining: u64,
}

impl ProgressUpdate {
    /// Completed fraction for display, clamped to 1.0.
    pub fn fraction(&self) -> f64 {
        if self.total_pending_at_start == 0 {
            return 1.0;
        }
        (self.processed_so_far as f64 / self.total_pending_at_start as f64).min(1.0)
    }
}

/// Receiver of progress snapshots.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _update: ProgressUpdate) {}
}

impl ProgressSink for mpsc::Sender<ProgressUpdate> {
    fn report(&self, update: ProgressUpdate) {
        let _ = self.try_send(update);
    }
}

impl ProgressSink for mpsc::UnboundedSender<ProgressUpdate> {
    fn report(&self, update: ProgressUpdate) {
        let _ = self.send(update);
    }
}

/// Adapter turning a closure into a [`ProgressSink`].
pub struct FnSink<F>(pub F);

impl<F> ProgressSink for FnSink<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.0)(update)
    }
}
