//! End-to-end tests against real shells in a pseudo-terminal.
//!
//! Each test is skipped when its shell is not installed.

use std::path::PathBuf;
use std::time::Duration;

use pretty_assertions::assert_eq;
use shellbook_error::ErrorExt;
use shellbook_error::StatusCode;
use shellbook_shell::CommandOutcome;
use shellbook_shell::DriverError;
use shellbook_shell::ProcessDriver;
use shellbook_shell::PtyShell;
use shellbook_shell::PtyShellOptions;
use shellbook_shell::ShellType;
use tokio::sync::mpsc;

fn bash() -> Option<PathBuf> {
    which::which("bash").ok()
}

/// A hook-less POSIX shell.
fn posix_sh() -> Option<PathBuf> {
    let path = PathBuf::from("/bin/sh");
    path.exists().then_some(path)
}

async fn spawn_shell(program: PathBuf) -> PtyShell {
    let mut options = PtyShellOptions::new(program);
    options.startup_timeout = Duration::from_secs(10);
    PtyShell::spawn(options).await.expect("spawn shell")
}

/// Run a command and return its joined output with the outcome.
async fn run(shell: &PtyShell, command: &str) -> (String, Result<CommandOutcome, DriverError>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let result = tokio::time::timeout(Duration::from_secs(10), shell.run_command(command, tx))
        .await
        .expect("command timed out");
    let mut output = String::new();
    while let Ok(chunk) = rx.try_recv() {
        output.push_str(&chunk);
    }
    (output, result)
}

#[tokio::test]
async fn echo_produces_output_and_success() {
    let Some(program) = bash() else { return };
    let shell = spawn_shell(program).await;

    let (output, result) = run(&shell, "echo hello; echo world").await;
    let outcome = result.expect("echo succeeds");
    assert_eq!(outcome.exit_code, 0);
    assert!(output.contains("hello"), "{output:?}");
    assert!(output.contains("world"), "{output:?}");
    assert!(!output.contains('\u{1e}'), "marker leaked: {output:?}");
}

#[tokio::test]
async fn cwd_and_environment_persist() {
    let Some(program) = bash() else { return };
    let dir = tempfile::tempdir().unwrap();
    let dir_path = dir.path().canonicalize().unwrap();
    let shell = spawn_shell(program).await;

    let (output, result) = run(&shell, &format!("cd '{}'", dir_path.display())).await;
    assert_eq!(output, "");
    assert_eq!(result.unwrap().cwd, Some(dir_path.clone()));

    let (_, result) = run(&shell, "export SHELLBOOK_PERSISTED=persisted").await;
    assert!(result.is_ok());

    let (output, result) = run(&shell, "echo \"$SHELLBOOK_PERSISTED\"; pwd").await;
    assert!(result.is_ok());
    assert!(output.contains("persisted"), "{output:?}");
    assert!(output.contains(&dir_path.display().to_string()), "{output:?}");
}

#[tokio::test]
async fn non_zero_exit_is_command_failed() {
    let Some(program) = bash() else { return };
    let shell = spawn_shell(program).await;

    let (output, result) = run(&shell, "echo oops; (exit 3)").await;
    let err = result.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CommandFailed);
    assert_eq!(err.outcome().map(|o| o.exit_code), Some(3));
    assert!(output.contains("oops"));

    // The shell is still usable.
    let (_, result) = run(&shell, "true").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn terminate_interrupts_without_killing_shell() {
    let Some(program) = bash() else { return };
    let shell = std::sync::Arc::new(spawn_shell(program).await);

    let runner = {
        let shell = std::sync::Arc::clone(&shell);
        tokio::spawn(async move { run(&shell, "sleep 30").await })
    };
    tokio::time::sleep(Duration::from_millis(500)).await;
    shell.terminate();

    let (_, result) = runner.await.unwrap();
    let err = result.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CommandFailed);
    assert!(!shell.has_exited());

    let (output, result) = run(&shell, "echo alive").await;
    assert!(result.is_ok());
    assert!(output.contains("alive"));
}

#[tokio::test]
async fn forwarded_input_reaches_command() {
    let Some(program) = bash() else { return };
    let shell = std::sync::Arc::new(spawn_shell(program).await);

    let runner = {
        let shell = std::sync::Arc::clone(&shell);
        tokio::spawn(async move { run(&shell, "read line; echo \"got:$line\"").await })
    };
    tokio::time::sleep(Duration::from_millis(300)).await;
    shell.write(b"typed\n").unwrap();

    let (output, result) = runner.await.unwrap();
    assert!(result.is_ok());
    assert!(output.contains("got:typed"), "{output:?}");
}

#[tokio::test]
async fn second_command_while_busy_is_rejected() {
    let Some(program) = bash() else { return };
    let shell = std::sync::Arc::new(spawn_shell(program).await);

    let runner = {
        let shell = std::sync::Arc::clone(&shell);
        tokio::spawn(async move { run(&shell, "sleep 1").await })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (_, result) = run(&shell, "echo nope").await;
    assert_eq!(result.unwrap_err().status_code(), StatusCode::DriverBusy);
    assert!(runner.await.unwrap().1.is_ok());
}

#[tokio::test]
async fn exit_fails_pending_and_later_commands() {
    let Some(program) = bash() else { return };
    let shell = spawn_shell(program).await;

    let (_, result) = run(&shell, "exit 0").await;
    assert_eq!(result.unwrap_err().status_code(), StatusCode::ShellExited);
    assert!(shell.has_exited());

    let (_, result) = run(&shell, "echo after").await;
    assert_eq!(result.unwrap_err().status_code(), StatusCode::ShellExited);
}

#[tokio::test]
async fn resize_updates_columns() {
    let Some(program) = bash() else { return };
    let shell = spawn_shell(program).await;
    assert_eq!(shell.columns(), 80);

    shell.set_columns(132);
    assert_eq!(shell.columns(), 132);

    let (output, result) = run(&shell, "stty size").await;
    assert!(result.is_ok());
    assert!(output.contains("132"), "{output:?}");
}

#[tokio::test]
async fn terminate_while_idle_is_ignored() {
    let Some(program) = bash() else { return };
    let shell = spawn_shell(program).await;

    shell.terminate();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (output, result) = run(&shell, "echo after").await;
    assert_eq!(result.unwrap().exit_code, 0);
    assert!(output.contains("after"), "{output:?}");
}

#[tokio::test]
async fn sh_trailing_separator_and_comment_settle() {
    let Some(program) = posix_sh() else { return };
    let shell = spawn_shell(program).await;
    assert_eq!(shell.shell_type(), ShellType::Sh);

    let (output, result) = run(&shell, "echo a;").await;
    assert_eq!(result.expect("trailing ; is valid").exit_code, 0);
    assert!(output.contains('a'), "{output:?}");

    let (output, result) = run(&shell, "echo commented # trailing note").await;
    assert!(result.is_ok());
    assert!(output.contains("commented"), "{output:?}");

    let (output, result) = run(&shell, "sleep 0 &").await;
    assert!(result.is_ok(), "{output:?}");
}

#[tokio::test]
async fn sh_syntax_error_fails_and_shell_stays_usable() {
    let Some(program) = posix_sh() else { return };
    let shell = spawn_shell(program).await;

    for broken in ["echo a;;", "echo \"unterminated"] {
        let (output, result) = run(&shell, broken).await;
        let err = result.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CommandFailed);
        assert_ne!(err.outcome().map(|o| o.exit_code), Some(0));
        assert!(!output.is_empty(), "no diagnostic for {broken:?}");
    }

    let (output, result) = run(&shell, "echo still-here").await;
    assert_eq!(result.unwrap().exit_code, 0);
    assert!(output.contains("still-here"), "{output:?}");
}
