use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU16;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use shellbook_protocol::DataMessage;
use shellbook_shell::ChunkSender;
use tokio::sync::Notify;

use super::*;
use crate::handle::ExecutionState;
use crate::transform::TemplateTransform;

/// How the fake shell reacts to one command.
#[derive(Debug, Clone)]
enum Script {
    /// Print `chunks`, then exit.
    Exit {
        chunks: Vec<&'static str>,
        exit_code: i32,
        cwd: Option<&'static str>,
    },
    /// Print `chunks`, then block until interrupted. The interrupt itself
    /// prints `^C` and exits 130.
    Hang { chunks: Vec<&'static str> },
    /// Print `before`, wait for [`FakeDriver::release`], print `after`, exit 0.
    Gate {
        before: Vec<&'static str>,
        after: Vec<&'static str>,
    },
    /// The process dies mid-command.
    Die,
}

fn ok(chunks: Vec<&'static str>) -> Script {
    Script::Exit {
        chunks,
        exit_code: 0,
        cwd: None,
    }
}

#[derive(Default)]
struct FakeDriver {
    scripts: Mutex<HashMap<String, Script>>,
    commands: Mutex<Vec<String>>,
    written: Mutex<Vec<u8>>,
    columns: AtomicU16,
    terminations: AtomicUsize,
    running: AtomicBool,
    overlapped: AtomicBool,
    interrupt: Notify,
    release: Notify,
}

impl FakeDriver {
    fn new() -> Arc<Self> {
        let driver = Self::default();
        driver.columns.store(80, Ordering::SeqCst);
        Arc::new(driver)
    }

    fn script(&self, command: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .insert(command.to_string(), script);
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }

    fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl ProcessDriver for FakeDriver {
    fn write(&self, bytes: &[u8]) -> shellbook_shell::error::Result<()> {
        self.written.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }

    async fn run_command(
        &self,
        command_line: &str,
        chunks: ChunkSender,
    ) -> shellbook_shell::error::Result<CommandOutcome> {
        if self.running.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        self.commands.lock().unwrap().push(command_line.to_string());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(command_line)
            .cloned()
            .unwrap_or_else(|| ok(vec![]));

        // Yield so the queue gets a chance to misbehave.
        tokio::task::yield_now().await;

        let result = match script {
            Script::Exit {
                chunks: out,
                exit_code,
                cwd,
            } => {
                for chunk in out {
                    let _ = chunks.send(chunk.to_string());
                }
                let outcome = CommandOutcome {
                    cwd: cwd.map(PathBuf::from),
                    exit_code,
                };
                if exit_code == 0 {
                    Ok(outcome)
                } else {
                    Err(DriverError::command_failed(outcome))
                }
            }
            Script::Hang { chunks: out } => {
                for chunk in out {
                    let _ = chunks.send(chunk.to_string());
                }
                self.interrupt.notified().await;
                let _ = chunks.send("^C".to_string());
                Err(DriverError::command_failed(CommandOutcome {
                    cwd: None,
                    exit_code: 130,
                }))
            }
            Script::Gate { before, after } => {
                for chunk in before {
                    let _ = chunks.send(chunk.to_string());
                }
                self.release.notified().await;
                for chunk in after {
                    let _ = chunks.send(chunk.to_string());
                }
                Ok(CommandOutcome {
                    cwd: None,
                    exit_code: 0,
                })
            }
            Script::Die => Err(DriverError::shell_exited()),
        };
        self.running.store(false, Ordering::SeqCst);
        result
    }

    // Like a real shell, an interrupt with nothing running is dropped.
    fn terminate(&self) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        self.terminations.fetch_add(1, Ordering::SeqCst);
        self.interrupt.notify_one();
    }

    fn set_columns(&self, columns: u16) {
        self.columns.store(columns, Ordering::SeqCst);
    }

    fn columns(&self) -> u16 {
        self.columns.load(Ordering::SeqCst)
    }
}

async fn collect(output: &mut OutputStream) -> Vec<CellOutput> {
    let mut items = Vec::new();
    while let Some(item) =
        tokio::time::timeout(Duration::from_secs(5), output.recv())
            .await
            .expect("output stream stalled")
    {
        items.push(item);
    }
    items
}

async fn ended(handle: &ExecutionHandle) -> bool {
    tokio::time::timeout(Duration::from_secs(5), handle.wait_ended())
        .await
        .expect("execution never ended")
}

/// Wait for the next data message, which proves the execution is running.
async fn next_data(output: &mut OutputStream) -> DataMessage {
    let item = tokio::time::timeout(Duration::from_secs(5), output.recv())
        .await
        .expect("no output")
        .expect("stream closed");
    match item {
        CellOutput::Message(OutputMessage::Data(data)) => data,
        other => panic!("expected data, got {other:?}"),
    }
}

fn data_chunks(items: &[CellOutput]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            CellOutput::Message(OutputMessage::Data(data)) => Some(data.chunk.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_blank_submission_ends_immediately() {
    let driver = FakeDriver::new();
    let queue = QueueManager::new(driver.clone());

    let Submission { handle, mut output } = queue.submit("  \n\t\n", CellId::from("blank"));
    assert_eq!(handle.state().success(), Some(true));
    assert_eq!(handle.order(), None);
    assert!(output.recv().await.is_none());

    tokio::task::yield_now().await;
    assert!(driver.commands().is_empty());
}

#[tokio::test]
async fn test_output_sequence_for_successful_run() {
    let driver = FakeDriver::new();
    driver.script("echo hi", ok(vec!["\u{1b}[1mhi\u{1b}[0m", "there"]));
    let queue = QueueManager::new(driver.clone());

    let identity = CellId::from("c1");
    let Submission { handle, mut output } = queue.submit("echo hi\n", identity.clone());
    assert!(ended(&handle).await);
    let items = collect(&mut output).await;

    assert_eq!(
        items,
        vec![
            CellOutput::Message(OutputMessage::data(
                identity.clone(),
                "\u{1b}[1mhi\u{1b}[0m",
                true,
                80
            )),
            CellOutput::Message(OutputMessage::data(identity.clone(), "there", false, 80)),
            CellOutput::Message(OutputMessage::finished(identity)),
            CellOutput::Replace("hi\nthere".to_string()),
        ]
    );
    assert!(matches!(handle.state(), ExecutionState::Ended { success: true, started_at: Some(_), .. }));
}

#[tokio::test]
async fn test_silent_command_emits_nothing() {
    let driver = FakeDriver::new();
    let queue = QueueManager::new(driver.clone());

    let Submission { handle, mut output } = queue.submit("true", CellId::from("quiet"));
    assert!(ended(&handle).await);
    assert!(collect(&mut output).await.is_empty());
}

#[tokio::test]
async fn test_non_zero_exit_fails_but_keeps_output() {
    let driver = FakeDriver::new();
    driver.script(
        "false",
        Script::Exit {
            chunks: vec!["boom"],
            exit_code: 1,
            cwd: None,
        },
    );
    let queue = QueueManager::new(driver.clone());

    let Submission { handle, mut output } = queue.submit("false", CellId::from("bad"));
    assert!(!ended(&handle).await);
    let items = collect(&mut output).await;
    assert_eq!(data_chunks(&items), vec!["boom"]);
    assert_eq!(items.last(), Some(&CellOutput::Replace("boom".to_string())));
}

#[tokio::test]
async fn test_multi_line_cell_is_joined() {
    let driver = FakeDriver::new();
    let queue = QueueManager::new(driver.clone());

    let Submission { handle, .. } = queue.submit("  cd /tmp  \n\n  ls\n", CellId::from("multi"));
    assert!(ended(&handle).await);
    assert_eq!(driver.commands(), vec!["cd /tmp; ls"]);
}

#[tokio::test]
async fn test_executions_run_one_at_a_time_in_order() {
    let driver = FakeDriver::new();
    for name in ["a", "b", "c", "d"] {
        let command = format!("echo {name}");
        driver.script(&command, ok(vec![]));
    }
    let queue = QueueManager::new(driver.clone());

    let handles: Vec<ExecutionHandle> = ["a", "b", "c", "d"]
        .iter()
        .map(|name| {
            queue
                .submit(&format!("echo {name}"), CellId::from(*name))
                .handle
        })
        .collect();
    for handle in &handles {
        assert!(ended(handle).await);
    }

    assert_eq!(driver.commands(), vec!["echo a", "echo b", "echo c", "echo d"]);
    assert!(!driver.overlapped.load(Ordering::SeqCst));
    let orders: Vec<ExecutionOrder> = handles.iter().filter_map(|h| h.order()).collect();
    assert!(orders.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_cancel_pending_skips_execution() {
    let driver = FakeDriver::new();
    driver.script("sleep", Script::Hang { chunks: vec!["zz"] });
    let queue = QueueManager::new(driver.clone());

    let mut first = queue.submit("sleep", CellId::from("first"));
    let second = queue.submit("echo second", CellId::from("second"));
    let third = queue.submit("echo third", CellId::from("third"));
    next_data(&mut first.output).await;

    assert!(second.handle.cancel());
    assert_eq!(second.handle.state().success(), Some(false));
    assert_eq!(driver.terminations(), 0);

    assert!(first.handle.cancel());
    assert!(!ended(&first.handle).await);
    assert!(ended(&third.handle).await);

    assert_eq!(driver.commands(), vec!["sleep", "echo third"]);
}

#[tokio::test]
async fn test_cancel_running_terminates_once() {
    let driver = FakeDriver::new();
    driver.script("sleep", Script::Hang { chunks: vec!["started"] });
    let queue = QueueManager::new(driver.clone());

    let identity = CellId::from("sleepy");
    let Submission { handle, mut output } = queue.submit("sleep", identity.clone());
    let first = next_data(&mut output).await;
    assert!(first.is_first_chunk_of_execution);

    assert!(handle.cancel());
    assert!(!handle.cancel());
    assert!(!ended(&handle).await);
    assert_eq!(driver.terminations(), 1);

    // Output after the cancel request is dropped; earlier output is
    // still finished and replaced.
    assert_eq!(
        collect(&mut output).await,
        vec![
            CellOutput::Message(OutputMessage::finished(identity)),
            CellOutput::Replace("started".to_string()),
        ]
    );

    // The queue keeps going.
    let next = queue.submit("echo next", CellId::from("next"));
    assert!(ended(&next.handle).await);
}

#[tokio::test]
async fn test_cancel_running_before_first_chunk_interrupts() {
    let driver = FakeDriver::new();
    driver.script("read", Script::Hang { chunks: vec![] });
    let queue = QueueManager::new(driver.clone());

    let Submission { handle, mut output } = queue.submit("read", CellId::from("quiet"));
    tokio::time::timeout(Duration::from_secs(5), async {
        while !matches!(handle.state(), ExecutionState::Running { .. }) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("execution never started");

    assert!(handle.cancel());
    assert!(!ended(&handle).await);
    assert_eq!(driver.terminations(), 1);
    // The interrupt's own echo arrives after the cancel and is dropped.
    assert!(collect(&mut output).await.is_empty());
    assert_eq!(driver.commands(), vec!["read"]);
}

#[tokio::test]
async fn test_cancelled_queued_stream_closes_without_messages() {
    let driver = FakeDriver::new();
    driver.script("sleep", Script::Hang { chunks: vec!["zz"] });
    let queue = QueueManager::new(driver.clone());

    let mut first = queue.submit("sleep", CellId::from("first"));
    let mut second = queue.submit("echo second", CellId::from("second"));
    next_data(&mut first.output).await;

    assert!(second.handle.cancel());
    // Closes while the first execution is still hanging.
    assert!(collect(&mut second.output).await.is_empty());
    assert!(!first.handle.is_ended());

    first.handle.cancel();
    assert!(!ended(&first.handle).await);
    assert_eq!(driver.commands(), vec!["sleep"]);
}

#[tokio::test]
async fn test_cancel_after_end_is_noop() {
    let driver = FakeDriver::new();
    let queue = QueueManager::new(driver.clone());

    let Submission { handle, .. } = queue.submit("true", CellId::from("done"));
    assert!(ended(&handle).await);
    assert!(!handle.cancel());
    assert_eq!(handle.state().success(), Some(true));
    tokio::task::yield_now().await;
    assert_eq!(driver.terminations(), 0);
}

#[tokio::test]
async fn test_shell_exit_fails_execution_and_queue_moves_on() {
    let driver = FakeDriver::new();
    driver.script("exit", Script::Die);
    let queue = QueueManager::new(driver.clone());

    let mut dead = queue.submit("exit", CellId::from("dead"));
    let after = queue.submit("echo after", CellId::from("after"));
    assert!(!ended(&dead.handle).await);
    assert!(collect(&mut dead.output).await.is_empty());
    assert!(ended(&after.handle).await);
}

struct RejectDangerous;

impl CommandTransform for RejectDangerous {
    fn transform(&self, command: &str, _ctx: &ExecutionContext) -> Result<String, crate::TransformError> {
        if command.contains("rm -rf") {
            Err(crate::TransformError::rejected("refusing to run rm -rf"))
        } else {
            Ok(command.to_string())
        }
    }
}

#[tokio::test]
async fn test_transform_failure_becomes_error_output() {
    let driver = FakeDriver::new();
    let queue = QueueManager::with_transform(driver.clone(), Arc::new(RejectDangerous));

    let mut rejected = queue.submit("rm -rf /", CellId::from("danger"));
    let fine = queue.submit("echo fine", CellId::from("fine"));

    assert!(!ended(&rejected.handle).await);
    assert_eq!(
        collect(&mut rejected.output).await,
        vec![CellOutput::Error("refusing to run rm -rf".to_string())]
    );
    assert!(matches!(
        rejected.handle.state(),
        ExecutionState::Ended { success: false, started_at: Some(_), .. }
    ));
    assert!(ended(&fine.handle).await);
    assert_eq!(driver.commands(), vec!["echo fine"]);
}

#[tokio::test]
async fn test_template_sees_working_directory_of_previous_command() {
    let driver = FakeDriver::new();
    driver.script(
        "cd /srv",
        Script::Exit {
            chunks: vec![],
            exit_code: 0,
            cwd: Some("/srv"),
        },
    );
    let variables = BTreeMap::from([("name".to_string(), "world".to_string())]);
    let queue = QueueManager::with_transform(driver.clone(), Arc::new(TemplateTransform::new(variables)));

    let first = queue.submit("cd /srv", CellId::from("cd"));
    let second = queue.submit("echo {{ name }} {{ cwd }}", CellId::from("echo"));
    assert!(ended(&first.handle).await);
    assert!(ended(&second.handle).await);

    assert_eq!(driver.commands(), vec!["cd /srv", "echo world /srv"]);
}

#[tokio::test]
async fn test_forward_reaches_only_active_cell() {
    let driver = FakeDriver::new();
    driver.script("read", Script::Hang { chunks: vec!["> "] });
    let queue = QueueManager::new(driver.clone());

    let reader = CellId::from("reader");
    let mut running = queue.submit("read", reader.clone());
    let waiting = queue.submit("echo later", CellId::from("waiting"));
    next_data(&mut running.output).await;

    queue.forward(waiting.handle.identity(), b"ignored");
    queue.forward(&reader, b"typed\n");
    running.handle.cancel();
    assert!(!ended(&running.handle).await);
    assert!(ended(&waiting.handle).await);

    assert_eq!(driver.written(), b"typed\n".to_vec());
}

#[tokio::test]
async fn test_resize_applies_to_later_chunks() {
    let driver = FakeDriver::new();
    driver.script("wide", ok(vec!["row"]));
    let queue = QueueManager::new(driver.clone());

    queue.resize(132);
    let mut wide = queue.submit("wide", CellId::from("wide"));
    assert!(ended(&wide.handle).await);
    let data = next_data(&mut wide.output).await;
    assert_eq!(data.terminal_columns, 132);
}

#[tokio::test]
async fn test_resize_mid_stream_applies_to_later_chunks() {
    let driver = FakeDriver::new();
    driver.script(
        "top",
        Script::Gate {
            before: vec!["narrow"],
            after: vec!["wide"],
        },
    );
    let queue = QueueManager::new(driver.clone());

    let mut top = queue.submit("top", CellId::from("top"));
    let first = next_data(&mut top.output).await;
    assert_eq!(first.terminal_columns, 80);

    queue.resize(120);
    driver.release();
    assert!(ended(&top.handle).await);

    let second = next_data(&mut top.output).await;
    assert_eq!(second.chunk, "wide");
    assert!(!second.is_first_chunk_of_execution);
    assert_eq!(second.terminal_columns, 120);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submitters_run_serially_in_order() {
    let driver = FakeDriver::new();
    let queue = Arc::new(QueueManager::new(driver.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|task| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                let mut submitted = Vec::new();
                for n in 0..5 {
                    let command = format!("echo {task}-{n}");
                    let handle = queue
                        .submit(&command, CellId::from(format!("c{task}-{n}")))
                        .handle;
                    submitted.push((handle, command));
                    tokio::task::yield_now().await;
                }
                submitted
            })
        })
        .collect();

    let mut submitted = Vec::new();
    for task in tasks {
        submitted.extend(task.await.unwrap());
    }
    for (handle, _) in &submitted {
        assert!(ended(handle).await);
    }

    submitted.sort_by_key(|(handle, _)| handle.order());
    let expected: Vec<String> = submitted.into_iter().map(|(_, command)| command).collect();
    assert_eq!(expected.len(), 40);
    assert_eq!(driver.commands(), expected);
    assert!(!driver.overlapped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_shutdown_fails_queued_and_interrupts_active() {
    let driver = FakeDriver::new();
    driver.script("sleep", Script::Hang { chunks: vec!["zz"] });
    let queue = QueueManager::new(driver.clone());

    let mut active = queue.submit("sleep", CellId::from("active"));
    let queued = queue.submit("echo queued", CellId::from("queued"));
    next_data(&mut active.output).await;

    queue.shutdown();
    assert!(!ended(&queued.handle).await);
    assert!(!ended(&active.handle).await);
    assert_eq!(driver.terminations(), 1);

    let late = queue.submit("echo late", CellId::from("late"));
    assert!(!ended(&late.handle).await);
    assert_eq!(driver.commands(), vec!["sleep"]);
}

#[tokio::test]
async fn test_drop_shuts_down_queue() {
    let driver = FakeDriver::new();
    driver.script("sleep", Script::Hang { chunks: vec!["zz"] });
    let queue = QueueManager::new(driver.clone());

    let mut active = queue.submit("sleep", CellId::from("active"));
    let queued = queue.submit("echo queued", CellId::from("queued"));
    next_data(&mut active.output).await;
    drop(queue);

    assert!(!ended(&active.handle).await);
    assert!(!ended(&queued.handle).await);
}
