//! [`ProcessDriver`] backed by one interactive shell in a pseudo-terminal.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU16;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use portable_pty::Child;
use portable_pty::CommandBuilder;
use portable_pty::MasterPty;
use portable_pty::PtySize;
use portable_pty::native_pty_system;
use snafu::OptionExt;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::driver::ChunkSender;
use crate::driver::CommandOutcome;
use crate::driver::ProcessDriver;
use crate::error::Result;
use crate::error::driver_error::BusySnafu;
use crate::error::driver_error::CommandFailedSnafu;
use crate::error::driver_error::ShellExitedSnafu;
use crate::error::driver_error::SpawnSnafu;
use crate::error::driver_error::StartupTimeoutSnafu;
use crate::error::driver_error::TerminalSnafu;
use crate::marker::Marker;
use crate::marker::MarkerScanner;
use crate::marker::ScanEvent;
use crate::shell_types::ShellType;
use crate::shell_types::detect_shell_type;
use crate::utf8::Utf8Decoder;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// The terminal's interrupt character (Ctrl-C).
const INTERRUPT: u8 = 0x03;

/// Status reported for a command interrupted before it was sent.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Status POSIX shells use for a syntax error.
const SYNTAX_ERROR_EXIT_CODE: i32 = 2;

/// How to start the shell.
#[derive(Debug, Clone)]
pub struct PtyShellOptions {
    pub program: PathBuf,
    /// Arguments for the shell. Empty means the shell type's defaults.
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub columns: u16,
    pub rows: u16,
    pub startup_timeout: Duration,
}

impl PtyShellOptions {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            columns: 80,
            rows: 24,
            startup_timeout: Duration::from_secs(5),
        }
    }
}

/// The command currently waiting for its marker.
struct ActiveCommand {
    chunks: ChunkSender,
    done: oneshot::Sender<Marker>,
    /// The command line has been written to the terminal.
    sent: bool,
    /// Interrupt requested before the line was sent.
    interrupted: bool,
}

#[derive(Default)]
struct Routing {
    active: Option<ActiveCommand>,
    startup: Option<oneshot::Sender<Marker>>,
}

/// State shared between the driver and its reader thread.
struct Shared {
    routing: Mutex<Routing>,
    exited: AtomicBool,
}

impl Shared {
    fn routing(&self) -> std::sync::MutexGuard<'_, Routing> {
        // Poisoning only means a reader panicked mid-update; the routing
        // table itself is still consistent.
        self.routing
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn dispatch(&self, event: ScanEvent) {
        let mut routing = self.routing();
        match event {
            ScanEvent::Output(text) => match routing.active.as_ref() {
                Some(active) => {
                    let _ = active.chunks.send(text);
                }
                None => trace!(len = text.len(), "Dropping output while idle"),
            },
            ScanEvent::Marker(marker) => {
                if let Some(active) = routing.active.take() {
                    let _ = active.done.send(marker);
                } else if let Some(startup) = routing.startup.take() {
                    let _ = startup.send(marker);
                } else {
                    debug!(exit_code = marker.exit_code, "Marker with no pending command");
                }
            }
        }
    }

    /// The shell is gone: fail whoever is waiting.
    fn close(&self, tail: Option<String>) {
        self.exited.store(true, Ordering::SeqCst);
        let mut routing = self.routing();
        if let (Some(text), Some(active)) = (tail, routing.active.as_ref()) {
            let _ = active.chunks.send(text);
        }
        // Dropping the senders resolves the waiters with ShellExited.
        routing.active = None;
        routing.startup = None;
    }
}

/// A persistent shell running in a pseudo-terminal.
///
/// Completion of each command is detected through a marker printed by the
/// shell's prompt hook, so the same shell process serves every command and
/// keeps its working directory and environment.
pub struct PtyShell {
    program: PathBuf,
    shell_type: ShellType,
    nonce: String,
    shared: Arc<Shared>,
    input_tx: mpsc::UnboundedSender<Vec<u8>>,
    master: Mutex<Box<dyn MasterPty + Send>>,
    child: Mutex<Box<dyn Child + Send + Sync>>,
    columns: AtomicU16,
    rows: u16,
}

impl PtyShell {
    /// Spawn the shell and wait until it has printed its first marker.
    pub async fn spawn(options: PtyShellOptions) -> Result<Self> {
        let shell_type = detect_shell_type(&options.program).unwrap_or(ShellType::Sh);
        let nonce = uuid::Uuid::new_v4().simple().to_string();

        let pair = native_pty_system()
            .openpty(PtySize {
                rows: options.rows,
                cols: options.columns,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| {
                SpawnSnafu {
                    message: e.to_string(),
                }
                .build()
            })?;

        let mut command = CommandBuilder::new(&options.program);
        let args = if options.args.is_empty() {
            shell_type.default_args()
        } else {
            options.args.clone()
        };
        for arg in &args {
            command.arg(arg);
        }
        match &options.cwd {
            Some(cwd) => command.cwd(cwd),
            None => {
                if let Ok(cwd) = std::env::current_dir() {
                    command.cwd(cwd);
                }
            }
        }
        command.env("TERM", "xterm-256color");
        for (key, value) in &options.env {
            command.env(key, value);
        }

        let child = pair.slave.spawn_command(command).map_err(|e| {
            SpawnSnafu {
                message: format!("{}: {e}", options.program.display()),
            }
            .build()
        })?;
        drop(pair.slave);

        let reader = match pair.master.try_clone_reader() {
            Ok(reader) => reader,
            Err(e) => {
                terminate_child(child);
                return SpawnSnafu {
                    message: e.to_string(),
                }
                .fail();
            }
        };
        let writer = match pair.master.take_writer() {
            Ok(writer) => writer,
            Err(e) => {
                terminate_child(child);
                return SpawnSnafu {
                    message: e.to_string(),
                }
                .fail();
            }
        };

        let (startup_tx, startup_rx) = oneshot::channel();
        let shared = Arc::new(Shared {
            routing: Mutex::new(Routing {
                active: None,
                startup: Some(startup_tx),
            }),
            exited: AtomicBool::new(false),
        });

        let (input_tx, input_rx) = mpsc::unbounded_channel();
        spawn_read_loop(reader, Arc::clone(&shared), nonce.clone());
        spawn_write_loop(writer, input_rx);

        let shell = Self {
            program: options.program.clone(),
            shell_type,
            nonce,
            shared,
            input_tx,
            master: Mutex::new(pair.master),
            child: Mutex::new(child),
            columns: AtomicU16::new(options.columns),
            rows: options.rows,
        };

        shell.send(shell.shell_type.setup_script(&shell.nonce).into_bytes())?;

        let timeout_ms = options.startup_timeout.as_millis() as u64;
        match tokio::time::timeout(options.startup_timeout, startup_rx).await {
            Ok(Ok(marker)) => {
                debug!(
                    shell = shell.shell_type.name(),
                    program = %options.program.display(),
                    cwd = ?marker.cwd,
                    "Shell ready"
                );
                Ok(shell)
            }
            Ok(Err(_)) => ShellExitedSnafu.fail(),
            Err(_) => StartupTimeoutSnafu { timeout_ms }.fail(),
        }
    }

    pub fn shell_type(&self) -> ShellType {
        self.shell_type
    }

    /// Whether the shell process has exited.
    pub fn has_exited(&self) -> bool {
        self.shared.exited.load(Ordering::SeqCst)
    }

    fn send(&self, bytes: Vec<u8>) -> Result<()> {
        if self.has_exited() {
            return ShellExitedSnafu.fail();
        }
        self.input_tx
            .send(bytes)
            .ok()
            .context(ShellExitedSnafu)
    }
}

#[async_trait]
impl ProcessDriver for PtyShell {
    fn write(&self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.send(bytes.to_vec())
    }

    async fn run_command(&self, command_line: &str, chunks: ChunkSender) -> Result<CommandOutcome> {
        if self.has_exited() {
            return ShellExitedSnafu.fail();
        }

        let (done_tx, done_rx) = oneshot::channel();
        {
            let mut routing = self.shared.routing();
            if routing.active.is_some() {
                return BusySnafu.fail();
            }
            routing.active = Some(ActiveCommand {
                chunks,
                done: done_tx,
                sent: false,
                interrupted: false,
            });
        }

        // Without a prompt hook the marker is parsed together with the
        // command, so a syntax error would swallow it.
        let rejected = if self.shell_type.has_prompt_hook() {
            None
        } else {
            check_syntax(&self.program, command_line).await
        };

        {
            let mut routing = self.shared.routing();
            let Some(active) = routing.active.as_mut() else {
                return ShellExitedSnafu.fail();
            };
            if let Some(rejected) = rejected {
                let _ = active.chunks.send(rejected.message);
                routing.active = None;
                debug!(exit_code = rejected.exit_code, "Command rejected by syntax check");
                return CommandFailedSnafu {
                    outcome: CommandOutcome {
                        cwd: None,
                        exit_code: rejected.exit_code,
                    },
                }
                .fail();
            }
            if active.interrupted {
                routing.active = None;
                debug!("Interrupted before the command was sent");
                return CommandFailedSnafu {
                    outcome: CommandOutcome {
                        cwd: None,
                        exit_code: INTERRUPTED_EXIT_CODE,
                    },
                }
                .fail();
            }

            let line = self.shell_type.command_line(command_line, &self.nonce);
            if let Err(err) = self.send(line.into_bytes()) {
                routing.active = None;
                return Err(err);
            }
            active.sent = true;
        }
        trace!(command = command_line, "Command sent");

        let marker = done_rx.await.ok().context(ShellExitedSnafu)?;
        let outcome = CommandOutcome {
            cwd: marker.cwd,
            exit_code: marker.exit_code,
        };
        debug!(exit_code = outcome.exit_code, cwd = ?outcome.cwd, "Command settled");

        if outcome.success() {
            Ok(outcome)
        } else {
            CommandFailedSnafu { outcome }.fail()
        }
    }

    fn terminate(&self) {
        let mut routing = self.shared.routing();
        match routing.active.as_mut() {
            // An interrupt at an idle prompt would print a stray marker.
            None => debug!("No command running; interrupt skipped"),
            Some(active) if !active.sent => {
                debug!("Interrupt before send; command will not run");
                active.interrupted = true;
            }
            Some(_) => {
                debug!("Sending interrupt to foreground process");
                if let Err(err) = self.send(vec![INTERRUPT]) {
                    warn!(error = %err, "Failed to send interrupt");
                }
            }
        }
    }

    fn set_columns(&self, columns: u16) {
        if columns == 0 {
            return;
        }
        self.columns.store(columns, Ordering::SeqCst);
        let master = self
            .master
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let resized = master.resize(PtySize {
            rows: self.rows,
            cols: columns,
            pixel_width: 0,
            pixel_height: 0,
        });
        if let Err(e) = resized {
            let err = TerminalSnafu {
                message: e.to_string(),
            }
            .build();
            warn!(error = %err, columns, "Resize failed");
        }
    }

    fn columns(&self) -> u16 {
        self.columns.load(Ordering::SeqCst)
    }
}

impl Drop for PtyShell {
    fn drop(&mut self) {
        let child = self
            .child
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let _ = child.kill();
    }
}

impl std::fmt::Debug for PtyShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyShell")
            .field("shell_type", &self.shell_type)
            .field("columns", &self.columns())
            .field("exited", &self.has_exited())
            .finish_non_exhaustive()
    }
}

/// A command the shell refused to parse.
#[derive(Debug)]
struct SyntaxRejection {
    exit_code: i32,
    message: String,
}

/// Parse `command` with `<program> -n -c` without running it.
///
/// A checker that cannot be started lets the command through.
async fn check_syntax(program: &Path, command: &str) -> Option<SyntaxRejection> {
    let checked = tokio::process::Command::new(program)
        .arg("-n")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await;
    match checked {
        Ok(output) if output.status.success() => None,
        Ok(output) => Some(SyntaxRejection {
            exit_code: output.status.code().unwrap_or(SYNTAX_ERROR_EXIT_CODE),
            message: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
        Err(err) => {
            warn!(error = %err, program = %program.display(), "Syntax check unavailable");
            None
        }
    }
}

fn terminate_child(mut child: Box<dyn Child + Send + Sync>) {
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_read_loop(mut reader: Box<dyn Read + Send>, shared: Arc<Shared>, nonce: String) {
    std::thread::spawn(move || {
        let mut decoder = Utf8Decoder::new();
        let mut scanner = MarkerScanner::new(&nonce);
        let mut buffer = [0_u8; READ_CHUNK_SIZE];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => {
                    let text = decoder.decode(&buffer[..read]);
                    for event in scanner.feed(&text) {
                        shared.dispatch(event);
                    }
                }
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }

        let mut tail = scanner.flush().unwrap_or_default();
        tail.push_str(&decoder.finish());
        debug!("Shell output closed");
        shared.close(Some(tail).filter(|t| !t.is_empty()));
    });
}

fn spawn_write_loop(mut writer: Box<dyn Write + Send>, mut input_rx: mpsc::UnboundedReceiver<Vec<u8>>) {
    std::thread::spawn(move || {
        while let Some(input) = input_rx.blocking_recv() {
            if input.is_empty() {
                continue;
            }
            if writer.write_all(&input).is_err() {
                break;
            }
            if writer.flush().is_err() {
                break;
            }
        }
    });
}

#[cfg(test)]
#[path = "pty.test.rs"]
mod tests;
