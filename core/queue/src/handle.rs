//! Execution handles: progress, completion and cancellation of one run.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use shellbook_protocol::CellId;
use shellbook_protocol::ExecutionOrder;
use shellbook_protocol::CellOutput;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Lifecycle of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExecutionState {
    /// Queued, not yet promoted.
    Pending,
    Running {
        started_at: DateTime<Utc>,
    },
    /// Terminal. `started_at` is `None` when the run never started.
    Ended {
        success: bool,
        started_at: Option<DateTime<Utc>>,
        ended_at: DateTime<Utc>,
    },
}

impl ExecutionState {
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended { .. })
    }

    /// `Some(success)` once ended.
    pub fn success(&self) -> Option<bool> {
        match self {
            Self::Ended { success, .. } => Some(*success),
            _ => None,
        }
    }

    /// Wall-clock run time, for runs that started and ended.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match self {
            Self::Ended {
                started_at: Some(started_at),
                ended_at,
                ..
            } => Some(*ended_at - *started_at),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    identity: CellId,
    order: Option<ExecutionOrder>,
    state: Mutex<ExecutionState>,
    cancel: CancellationToken,
    ended: watch::Sender<bool>,
    /// Dropped on the terminal transition, which closes the output stream.
    output: Mutex<Option<mpsc::UnboundedSender<CellOutput>>>,
}

/// Shared handle to one execution.
///
/// Cloning is cheap; all clones observe the same execution.
#[derive(Debug, Clone)]
pub struct ExecutionHandle {
    inner: Arc<Inner>,
}

impl ExecutionHandle {
    pub(crate) fn pending(
        identity: CellId,
        order: ExecutionOrder,
        output: mpsc::UnboundedSender<CellOutput>,
    ) -> Self {
        Self::build(identity, Some(order), ExecutionState::Pending, Some(output))
    }

    /// A handle that has already ended, for submissions that never queue.
    pub(crate) fn ended(identity: CellId, success: bool) -> Self {
        let state = ExecutionState::Ended {
            success,
            started_at: None,
            ended_at: Utc::now(),
        };
        let handle = Self::build(identity, None, state, None);
        handle.inner.ended.send_replace(true);
        handle
    }

    fn build(
        identity: CellId,
        order: Option<ExecutionOrder>,
        state: ExecutionState,
        output: Option<mpsc::UnboundedSender<CellOutput>>,
    ) -> Self {
        let (ended, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                identity,
                order,
                state: Mutex::new(state),
                cancel: CancellationToken::new(),
                ended,
                output: Mutex::new(output),
            }),
        }
    }

    pub fn identity(&self) -> &CellId {
        &self.inner.identity
    }

    /// Display number; `None` for blank submissions.
    pub fn order(&self) -> Option<ExecutionOrder> {
        self.inner.order
    }

    pub fn state(&self) -> ExecutionState {
        *self.lock_state()
    }

    pub fn is_ended(&self) -> bool {
        self.state().is_ended()
    }

    /// Whether [`cancel`](Self::cancel) has been called successfully.
    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Token cancelled when cancellation is requested.
    pub(crate) fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Request cancellation.
    ///
    /// A pending execution ends with failure before this returns. A running
    /// one gets its process interrupted and ends when the process settles.
    /// Returns `false` if cancellation was already requested or the
    /// execution has ended.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock_state();
        if self.inner.cancel.is_cancelled() {
            return false;
        }
        match *state {
            ExecutionState::Pending => {
                self.inner.cancel.cancel();
                *state = ExecutionState::Ended {
                    success: false,
                    started_at: None,
                    ended_at: Utc::now(),
                };
                drop(state);
                self.close_output();
                self.inner.ended.send_replace(true);
                debug!(order = ?self.inner.order, cell = %self.inner.identity, "Cancelled while queued");
                true
            }
            ExecutionState::Running { .. } => {
                // The runner task watches the token and interrupts the process.
                self.inner.cancel.cancel();
                drop(state);
                debug!(order = ?self.inner.order, cell = %self.inner.identity, "Cancel requested for running execution");
                true
            }
            ExecutionState::Ended { .. } => false,
        }
    }

    /// Wait until the execution ends and return whether it succeeded.
    pub async fn wait_ended(&self) -> bool {
        let mut ended = self.inner.ended.subscribe();
        // The sender lives in `inner`, so the channel cannot close while
        // we hold `self`.
        let _ = ended.wait_for(|ended| *ended).await;
        self.state().success().unwrap_or(false)
    }

    /// Promote a pending execution to running.
    ///
    /// Returns `false` when the execution was cancelled while queued; the
    /// caller must then skip it.
    pub(crate) fn start(&self) -> bool {
        let mut state = self.lock_state();
        if !matches!(*state, ExecutionState::Pending) || self.inner.cancel.is_cancelled() {
            return false;
        }
        *state = ExecutionState::Running {
            started_at: Utc::now(),
        };
        true
    }

    /// Move to the terminal state. Returns `false` if already ended.
    pub(crate) fn finish(&self, success: bool) -> bool {
        let mut state = self.lock_state();
        let started_at = match *state {
            ExecutionState::Ended { .. } => return false,
            ExecutionState::Running { started_at } => Some(started_at),
            ExecutionState::Pending => None,
        };
        *state = ExecutionState::Ended {
            success,
            started_at,
            ended_at: Utc::now(),
        };
        drop(state);
        self.close_output();
        self.inner.ended.send_replace(true);
        true
    }

    /// Emit an item on this execution's output stream.
    ///
    /// Dropped once the execution has ended or nobody is listening.
    pub(crate) fn emit(&self, item: CellOutput) {
        if let Some(output) = self.lock_output().as_ref() {
            let _ = output.send(item);
        }
    }

    fn close_output(&self) {
        self.lock_output().take();
    }

    fn lock_output(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<CellOutput>>> {
        self.inner
            .output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_state(&self) -> MutexGuard<'_, ExecutionState> {
        // State transitions are single assignments, so a poisoned lock
        // still holds a valid state.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "handle.test.rs"]
mod tests;
