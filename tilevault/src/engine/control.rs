//! Cooperative session control signals.

use std::sync::Arc;
use tokio::sync::watch;

/// Scheduling state of the active download session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionState {
    Running,
    Paused,
    Cancelled,
}

/// Cloneable handle for pausing, resuming, and cancelling a download.
///
/// Signals are cooperative: the engine consults them at batch boundaries
/// only, so tiles already in flight always land. Cancellation is terminal
/// for the session; pause/resume have no effect once cancelled.
#[derive(Debug, Clone)]
pub struct SessionControl {
    tx: Arc<watch::Sender<SessionState>>,
}

impl SessionControl {
    /// Creates a control handle and the receiver the engine gates on.
    pub(crate) fn channel() -> (Self, watch::Receiver<SessionState>) {
        let (tx, rx) = watch::channel(SessionState::Running);
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Requests a pause. The next batch will not be scheduled until
    /// [`resume`](Self::resume) or [`cancel`](Self::cancel).
    pub fn pause(&self) {
        self.tx.send_if_modified(|state| {
            if *state == SessionState::Running {
                *state = SessionState::Paused;
                true
            } else {
                false
            }
        });
    }

    /// Resumes a paused session. No-op unless currently paused.
    pub fn resume(&self) {
        self.tx.send_if_modified(|state| {
            if *state == SessionState::Paused {
                *state = SessionState::Running;
                true
            } else {
                false
            }
        });
    }

    /// Requests cancellation. The session stops at the next batch boundary
    /// and returns partial results.
    pub fn cancel(&self) {
        self.tx.send_if_modified(|state| {
            if *state != SessionState::Cancelled {
                *state = SessionState::Cancelled;
                true
            } else {
                false
            }
        });
    }

    /// True while a pause is requested.
    pub fn is_paused(&self) -> bool {
        *self.tx.borrow() == SessionState::Paused
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow() == SessionState::Cancelled
    }

    /// Rearms the handle for a fresh session.
    pub(crate) fn reset(&self) {
        self.tx.send_replace(SessionState::Running);
    }
}
