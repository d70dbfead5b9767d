use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_transform_error_is_user_visible() {
    let err = TransformError::rejected("undefined value: project");
    assert_eq!(err.status_code(), StatusCode::TransformFailed);
    assert_eq!(err.output_msg(), "undefined value: project");
    assert!(!err.is_retryable());
}

#[test]
fn test_queue_closed() {
    let err = queue_error::ClosedSnafu.build();
    assert_eq!(err.status_code(), StatusCode::QueueClosed);
    assert!(err.status_code().should_log_error());
    assert_eq!(err.to_string(), "Execution queue is closed");
}
