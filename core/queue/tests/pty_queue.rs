//! The queue driving a real bash.
//!
//! Skipped when `bash` is not on `PATH`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use shellbook_protocol::CellId;
use shellbook_protocol::CellOutput;
use shellbook_protocol::OutputMessage;
use shellbook_queue::OutputStream;
use shellbook_queue::QueueManager;
use shellbook_queue::Submission;
use shellbook_queue::TemplateTransform;
use shellbook_shell::PtyShell;
use shellbook_shell::PtyShellOptions;

async fn bash_queue(variables: BTreeMap<String, String>) -> Option<QueueManager> {
    let program = which::which("bash").ok()?;
    let mut options = PtyShellOptions::new(program);
    options.startup_timeout = Duration::from_secs(10);
    let shell = PtyShell::spawn(options).await.expect("spawn bash");
    Some(QueueManager::with_transform(
        Arc::new(shell),
        Arc::new(TemplateTransform::new(variables)),
    ))
}

async fn transcript(output: &mut OutputStream) -> Option<String> {
    let mut replaced = None;
    while let Some(item) = tokio::time::timeout(Duration::from_secs(10), output.recv())
        .await
        .expect("output stalled")
    {
        if let CellOutput::Replace(text) = item {
            replaced = Some(text);
        }
    }
    replaced
}

#[tokio::test(flavor = "multi_thread")]
async fn cells_share_one_shell_session() {
    let Some(queue) = bash_queue(BTreeMap::new()).await else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let dir_path = dir.path().canonicalize().unwrap();

    let first = queue.submit(
        &format!("cd '{}'\nexport GREETING=hello", dir_path.display()),
        CellId::from("setup"),
    );
    let mut second = queue.submit("echo \"$GREETING from $(pwd)\"", CellId::from("echo"));

    assert!(first.handle.wait_ended().await);
    assert!(second.handle.wait_ended().await);
    let text = transcript(&mut second.output).await.unwrap();
    assert!(
        text.contains(&format!("hello from {}", dir_path.display())),
        "{text:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn first_data_message_is_flagged() {
    let Some(queue) = bash_queue(BTreeMap::new()).await else {
        return;
    };
    let Submission { handle, mut output } = queue.submit("printf 'x\\n'", CellId::from("flag"));
    assert!(handle.wait_ended().await);

    let mut firsts = Vec::new();
    while let Some(item) = output.recv().await {
        if let CellOutput::Message(OutputMessage::Data(data)) = item {
            firsts.push(data.is_first_chunk_of_execution);
        }
    }
    assert_eq!(firsts.first(), Some(&true));
    assert!(firsts.iter().skip(1).all(|first| !first));
}

#[tokio::test(flavor = "multi_thread")]
async fn cancel_running_sleep_then_continue() {
    let Some(queue) = bash_queue(BTreeMap::new()).await else {
        return;
    };
    let sleeper = queue.submit("sleep 30", CellId::from("sleep"));
    let mut queued = queue.submit("echo never", CellId::from("queued"));
    let mut after = queue.submit("echo after", CellId::from("after"));

    assert!(queued.handle.cancel());
    assert_eq!(queued.handle.state().success(), Some(false));
    assert!(queued.output.recv().await.is_none());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(sleeper.handle.cancel());
    let success = tokio::time::timeout(Duration::from_secs(10), sleeper.handle.wait_ended())
        .await
        .expect("sleep was not interrupted");
    assert!(!success);

    assert!(after.handle.wait_ended().await);
    let text = transcript(&mut after.output).await.unwrap();
    assert!(text.contains("after"), "{text:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn template_variables_expand_before_running() {
    let variables = BTreeMap::from([("target".to_string(), "templated".to_string())]);
    let Some(queue) = bash_queue(variables).await else {
        return;
    };
    let mut cell = queue.submit("echo {{ target }}", CellId::from("tpl"));
    assert!(cell.handle.wait_ended().await);
    let text = transcript(&mut cell.output).await.unwrap();
    assert!(text.contains("templated"), "{text:?}");

    let mut missing = queue.submit("echo {{ nope }}", CellId::from("missing"));
    assert!(!missing.handle.wait_ended().await);
    assert!(matches!(
        missing.output.recv().await,
        Some(CellOutput::Error(_))
    ));
}
