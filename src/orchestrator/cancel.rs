//! Cooperative cancellation for scoring runs.
//!
//! The handle is written from the UI side (Ctrl-C, a stop button); the
//! orchestrator only reads the signal at its per-batch checkpoint, so an
//! in-flight scoring call always runs to completion.

use std::sync::Arc;

use tokio::sync::watch;

/// Create a connected handle/signal pair.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (
        CancelHandle { tx: Arc::new(tx) },
        CancelSignal { rx: Some(rx) },
    )
}

/// Write side. Cancelling is idempotent and cannot be undone.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Read side, passed into the orchestrator.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// A signal that is never raised.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
