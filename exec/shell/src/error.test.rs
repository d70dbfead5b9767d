use super::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

#[test]
fn test_command_failed_carries_outcome() {
    let err = driver_error::CommandFailedSnafu {
        outcome: CommandOutcome {
            cwd: Some(PathBuf::from("/tmp")),
            exit_code: 2,
        },
    }
    .build();

    assert_eq!(err.status_code(), StatusCode::CommandFailed);
    assert_eq!(err.to_string(), "Command exited with status 2");
    let outcome = err.outcome().unwrap();
    assert_eq!(outcome.exit_code, 2);
    assert_eq!(outcome.cwd, Some(PathBuf::from("/tmp")));
}

#[test]
fn test_status_codes() {
    assert_eq!(
        driver_error::ShellExitedSnafu.build().status_code(),
        StatusCode::ShellExited
    );
    assert_eq!(
        driver_error::BusySnafu.build().status_code(),
        StatusCode::DriverBusy
    );
    assert!(driver_error::BusySnafu.build().is_retryable());
    assert_eq!(
        driver_error::StartupTimeoutSnafu { timeout_ms: 10u64 }
            .build()
            .status_code(),
        StatusCode::Timeout
    );
    assert!(driver_error::ShellExitedSnafu.build().outcome().is_none());
}

#[test]
fn test_public_constructors() {
    let err = DriverError::command_failed(CommandOutcome {
        cwd: None,
        exit_code: 130,
    });
    assert_eq!(err.outcome().map(|o| o.exit_code), Some(130));
    assert_eq!(
        DriverError::shell_exited().status_code(),
        StatusCode::ShellExited
    );
}
