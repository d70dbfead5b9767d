use std::fmt;

use super::*;

#[derive(Debug)]
struct TestError {
    message: &'static str,
    code: Option<StatusCode>,
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl Error for TestError {}

impl ErrorExt for TestError {
    fn status_code(&self) -> StatusCode {
        self.code.unwrap_or(StatusCode::Unknown)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_retryable_follows_status_code() {
    let busy = TestError {
        message: "shell is busy",
        code: Some(StatusCode::DriverBusy),
    };
    assert!(busy.is_retryable());

    let exited = TestError {
        message: "shell exited",
        code: Some(StatusCode::ShellExited),
    };
    assert!(!exited.is_retryable());
}

#[test]
fn test_transform_failure_is_shown_verbatim() {
    let err = TestError {
        message: "undefined value: project",
        code: Some(StatusCode::TransformFailed),
    };
    assert_eq!(err.output_msg(), "undefined value: project");
}

#[test]
fn test_unclassified_details_stay_hidden() {
    let err = TestError {
        message: "lock poisoned in reader",
        code: None,
    };
    assert_eq!(err.status_code(), StatusCode::Unknown);
    assert_eq!(err.output_msg(), "Internal error: 1000");
}

#[test]
fn test_downcast_through_as_any() {
    let err = TestError {
        message: "closed",
        code: Some(StatusCode::QueueClosed),
    };
    let dyn_err: &dyn ErrorExt = &err;
    assert!(dyn_err.as_any().downcast_ref::<TestError>().is_some());
    assert!(dyn_err.as_any().downcast_ref::<std::io::Error>().is_none());
}
