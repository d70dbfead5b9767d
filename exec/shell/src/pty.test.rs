use super::*;
use pretty_assertions::assert_eq;
use shellbook_error::ErrorExt;
use shellbook_error::StatusCode;

#[test]
fn test_options_defaults() {
    let options = PtyShellOptions::new("/bin/bash");
    assert_eq!(options.program, PathBuf::from("/bin/bash"));
    assert!(options.args.is_empty());
    assert_eq!(options.columns, 80);
    assert_eq!(options.rows, 24);
    assert_eq!(options.startup_timeout, Duration::from_secs(5));
}

#[tokio::test]
async fn test_spawn_missing_program_fails() {
    let options = PtyShellOptions::new("/nonexistent/shellbook-test-shell");
    let err = PtyShell::spawn(options).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::SpawnFailed);
}

#[test]
fn test_idle_output_is_dropped_and_marker_routes_to_startup() {
    let (startup_tx, mut startup_rx) = oneshot::channel();
    let shared = Shared {
        routing: Mutex::new(Routing {
            active: None,
            startup: Some(startup_tx),
        }),
        exited: AtomicBool::new(false),
    };

    shared.dispatch(ScanEvent::Output("banner".to_string()));
    shared.dispatch(ScanEvent::Marker(Marker {
        exit_code: 0,
        cwd: Some(PathBuf::from("/")),
    }));
    assert_eq!(startup_rx.try_recv().unwrap().cwd, Some(PathBuf::from("/")));
}

#[test]
fn test_close_fails_pending_command() {
    let shared = Shared {
        routing: Mutex::new(Routing::default()),
        exited: AtomicBool::new(false),
    };
    let (chunk_tx, mut chunk_rx) = mpsc::unbounded_channel();
    let (done_tx, mut done_rx) = oneshot::channel();
    shared.routing().active = Some(ActiveCommand {
        chunks: chunk_tx,
        done: done_tx,
        sent: true,
        interrupted: false,
    });

    shared.dispatch(ScanEvent::Output("partial".to_string()));
    shared.close(Some("tail".to_string()));

    assert!(shared.exited.load(Ordering::SeqCst));
    assert_eq!(chunk_rx.try_recv().unwrap(), "partial");
    assert_eq!(chunk_rx.try_recv().unwrap(), "tail");
    assert!(done_rx.try_recv().is_err());
}
