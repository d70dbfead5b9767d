use super::*;
use pretty_assertions::assert_eq;

fn pending_handle() -> (ExecutionHandle, mpsc::UnboundedReceiver<CellOutput>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = ExecutionHandle::pending(CellId::from("cell"), ExecutionOrder::next(), tx);
    (handle, rx)
}

#[test]
fn test_cancel_pending_ends_synchronously() {
    let (handle, mut output) = pending_handle();
    assert!(handle.cancel());

    let state = handle.state();
    assert_eq!(state.success(), Some(false));
    assert!(matches!(
        state,
        ExecutionState::Ended {
            started_at: None,
            ..
        }
    ));
    assert!(handle.is_cancel_requested());
    // The stream closes with the handle, not when the queue reaches it.
    assert!(matches!(
        output.try_recv(),
        Err(mpsc::error::TryRecvError::Disconnected)
    ));
}

#[test]
fn test_cancel_is_at_most_once() {
    let (handle, _output) = pending_handle();
    assert!(handle.cancel());
    assert!(!handle.cancel());
    assert!(!handle.clone().cancel());
}

#[test]
fn test_cancelled_pending_cannot_start() {
    let (handle, _output) = pending_handle();
    handle.cancel();
    assert!(!handle.start());
}

#[test]
fn test_cancel_running_fires_token_once() {
    let (handle, mut output) = pending_handle();
    let token = handle.cancellation_token();
    assert!(handle.start());
    assert!(matches!(handle.state(), ExecutionState::Running { .. }));

    assert!(handle.cancel());
    assert!(!handle.cancel());
    assert!(token.is_cancelled());
    // Still running until the process settles, and still streaming.
    assert!(!handle.is_ended());
    handle.emit(CellOutput::Replace("late".to_string()));
    assert_eq!(
        output.try_recv().unwrap(),
        CellOutput::Replace("late".to_string())
    );
}

#[test]
fn test_completion_wins_over_later_cancel() {
    let (handle, _output) = pending_handle();
    let token = handle.cancellation_token();
    handle.start();
    assert!(handle.finish(true));
    assert!(!handle.cancel());
    assert!(!token.is_cancelled());
    assert_eq!(handle.state().success(), Some(true));
}

#[test]
fn test_finish_closes_output() {
    let (handle, mut output) = pending_handle();
    handle.start();
    handle.emit(CellOutput::Error("boom".to_string()));
    handle.finish(false);
    handle.emit(CellOutput::Replace("after".to_string()));

    assert_eq!(
        output.try_recv().unwrap(),
        CellOutput::Error("boom".to_string())
    );
    assert!(matches!(
        output.try_recv(),
        Err(mpsc::error::TryRecvError::Disconnected)
    ));
}

#[test]
fn test_finish_only_once() {
    let (handle, _output) = pending_handle();
    handle.start();
    assert!(handle.finish(false));
    assert!(!handle.finish(true));
    assert_eq!(handle.state().success(), Some(false));
    assert!(handle.state().duration().is_some());
}

#[test]
fn test_ended_handle_has_no_order() {
    let handle = ExecutionHandle::ended(CellId::from("blank"), true);
    assert_eq!(handle.order(), None);
    assert_eq!(handle.state().success(), Some(true));
    assert!(!handle.cancel());
}

#[tokio::test]
async fn test_wait_ended_resolves_on_finish() {
    let (handle, _output) = pending_handle();
    handle.start();

    let waiter = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.wait_ended().await })
    };
    tokio::task::yield_now().await;
    handle.finish(true);
    assert!(waiter.await.unwrap());
}

#[tokio::test]
async fn test_wait_ended_after_the_fact() {
    let handle = ExecutionHandle::ended(CellId::from("blank"), true);
    assert!(handle.wait_ended().await);

    let (handle, _output) = pending_handle();
    handle.cancel();
    assert!(!handle.wait_ended().await);
}

#[test]
fn test_state_serializes_tagged() {
    let value = serde_json::to_value(ExecutionState::Pending).unwrap();
    assert_eq!(value, serde_json::json!({ "state": "pending" }));
}
