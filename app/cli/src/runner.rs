//! Submits cells to a fresh shell and renders their output in order.

use std::io::Read;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use shellbook_config::AppConfig;
use shellbook_protocol::CellId;
use shellbook_queue::ExecutionHandle;
use shellbook_queue::QueueManager;
use shellbook_queue::Submission;
use shellbook_queue::TemplateTransform;
use shellbook_shell::PtyShell;
use shellbook_shell::PtyShellOptions;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::render::CellSummary;
use crate::render::Renderer;

const STDIN_BUFFER_SIZE: usize = 4096;

/// Exit status after a second Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

pub fn shell_options(config: &AppConfig) -> PtyShellOptions {
    let mut options = PtyShellOptions::new(config.shell.program_or_default());
    options.args = config.shell.args.clone();
    options.cwd = config.shell.cwd.clone();
    options.env = config.shell.env.clone();
    options.columns = config.terminal.columns;
    options.rows = config.terminal.rows;
    options.startup_timeout = Duration::from_millis(config.shell.startup_timeout_ms);
    options
}

/// Run `cells` and render them to `out`. Returns whether every cell succeeded.
pub async fn run<W: Write>(
    config: &AppConfig,
    cells: &[String],
    renderer: &mut Renderer<W>,
) -> anyhow::Result<bool> {
    let options = shell_options(config);
    let program = options.program.clone();
    let shell = PtyShell::spawn(options)
        .await
        .with_context(|| format!("failed to start shell {}", program.display()))?;
    info!(shell = %program.display(), kind = shell.shell_type().name(), cells = cells.len(), "Shell ready");

    let queue = QueueManager::with_transform(
        Arc::new(shell),
        Arc::new(TemplateTransform::new(config.variables.clone())),
    );

    let submissions: Vec<Submission> = cells
        .iter()
        .enumerate()
        .map(|(index, text)| queue.submit(text, CellId::from(format!("cell-{}", index + 1))))
        .collect();
    let handles: Vec<ExecutionHandle> = submissions.iter().map(|s| s.handle.clone()).collect();

    let interrupts = tokio::spawn(watch_interrupts(handles));
    let mut stdin = spawn_stdin_reader();
    let mut stdin_open = true;

    let mut all_succeeded = true;
    for Submission { handle, mut output } in submissions {
        loop {
            tokio::select! {
                item = output.recv() => match item {
                    Some(item) => renderer.item(&item)?,
                    None => break,
                },
                bytes = stdin.recv(), if stdin_open => match bytes {
                    Some(bytes) => queue.forward(handle.identity(), &bytes),
                    None => stdin_open = false,
                },
            }
        }
        let success = handle.wait_ended().await;
        renderer.summary(&CellSummary::from_handle(&handle))?;
        debug!(cell = %handle.identity(), success, "Cell rendered");
        all_succeeded &= success;
    }

    interrupts.abort();
    queue.shutdown();
    Ok(all_succeeded)
}

/// First Ctrl-C cancels every cell; the second one exits.
async fn watch_interrupts(handles: Vec<ExecutionHandle>) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    let cancelled = handles.iter().filter(|handle| handle.cancel()).count();
    warn!(cancelled, "Interrupted; cancelling cells");
    eprintln!("\nInterrupted. Press Ctrl-C again to exit.");

    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Second interrupt; exiting");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
}

/// Read stdin on a detached thread.
///
/// Not `spawn_blocking`: a read parked on a terminal would keep the runtime
/// from shutting down.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<Vec<u8>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut stdin = std::io::stdin();
        let mut buffer = [0_u8; STDIN_BUFFER_SIZE];
        loop {
            match stdin.read(&mut buffer) {
                Ok(0) | Err(_) => break,
                Ok(read) => {
                    if tx.send(buffer[..read].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

#[cfg(test)]
#[path = "runner.test.rs"]
mod tests;
