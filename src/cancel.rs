//! Cooperative cancellation for in-flight fetch requests
//!
//! A `CancelHandle`/`CancelToken` pair lets the refresh orchestrator mark an
//! outstanding request as superseded. The token side is observed inside the
//! fetch future (via `tokio::select!`), so a cancelled request settles as
//! `FetchError::Cancelled` instead of delivering a stale result.

use tokio::sync::watch;

/// Creates a connected handle/token pair.
///
/// The handle stays with the party that may cancel (the orchestrator); the
/// token travels with the request. Dropping the handle also cancels the
/// token, so an abandoned request can never outlive its owner.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Owner side of a cancellation pair.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Marks the associated token as cancelled. Idempotent.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Request side of a cancellation pair. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Returns true once `cancel` has been called on the handle.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the handle cancels or is dropped. Intended for use as a
    /// `tokio::select!` branch alongside the actual work.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            // A closed channel means the handle is gone; treat as cancelled.
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
