//! The execution queue.
//!
//! [`QueueManager`] is a thin front for a single actor task that owns the
//! FIFO queue, the active slot, the last known working directory and the
//! process driver. Every public method only sends an [`Event`] to the
//! actor, so none of them block. Driver output comes back through the same
//! channel: a runner task forwards each chunk as [`Event::Chunk`] and
//! finally sends [`Event::Completed`]. The runner also watches the
//! execution's cancellation token and interrupts the process when it fires.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use shellbook_error::ErrorExt;
use shellbook_protocol::CellId;
use shellbook_protocol::CellOutput;
use shellbook_protocol::ExecutionOrder;
use shellbook_protocol::OutputMessage;
use shellbook_shell::CommandOutcome;
use shellbook_shell::DriverError;
use shellbook_shell::ProcessDriver;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::queue_error::ClosedSnafu;
use crate::handle::ExecutionHandle;
use crate::output::OutputStream;
use crate::request::ExecutionRequest;
use crate::request::normalize_cell_text;
use crate::transcript::Transcript;
use crate::transform::CommandTransform;
use crate::transform::ExecutionContext;
use crate::transform::IdentityTransform;

/// Messages handled by the queue actor.
#[derive(Debug)]
pub(crate) enum Event {
    Submit(ExecutionRequest),
    Forward {
        identity: CellId,
        bytes: Vec<u8>,
    },
    Resize {
        columns: u16,
    },
    Chunk {
        order: ExecutionOrder,
        text: String,
    },
    Completed {
        order: ExecutionOrder,
        result: Result<CommandOutcome, DriverError>,
    },
    Shutdown,
}

/// What [`QueueManager::submit`] hands back.
#[derive(Debug)]
pub struct Submission {
    pub handle: ExecutionHandle,
    pub output: OutputStream,
}

/// Serializes cell executions onto one shared shell.
///
/// Must be created inside a tokio runtime. Dropping the manager shuts the
/// queue down.
#[derive(Debug)]
pub struct QueueManager {
    events: mpsc::UnboundedSender<Event>,
    /// Held while an order is taken and enqueued, so concurrent submitters
    /// reach the actor in order.
    submit_lock: Mutex<()>,
}

impl QueueManager {
    /// Start a queue that runs commands unchanged.
    pub fn new(driver: Arc<dyn ProcessDriver>) -> Self {
        Self::with_transform(driver, Arc::new(IdentityTransform))
    }

    /// Start a queue that passes every command through `transform`.
    pub fn with_transform(
        driver: Arc<dyn ProcessDriver>,
        transform: Arc<dyn CommandTransform>,
    ) -> Self {
        let (events, rx) = mpsc::unbounded_channel();
        let actor = QueueActor {
            driver,
            transform,
            events: events.clone(),
            queue: VecDeque::new(),
            active: None,
            cwd: None,
            closing: false,
        };
        tokio::spawn(actor.run(rx));
        Self {
            events,
            submit_lock: Mutex::new(()),
        }
    }

    /// Submit cell text for execution.
    ///
    /// Blank text ends immediately with success and never reaches the
    /// shell. Anything else is normalized to one command line and queued.
    pub fn submit(&self, cell_text: &str, identity: CellId) -> Submission {
        let Some(command) = normalize_cell_text(cell_text) else {
            debug!(cell = %identity, "Blank submission");
            return Submission {
                handle: ExecutionHandle::ended(identity, true),
                output: OutputStream::closed(),
            };
        };

        let _guard = self
            .submit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let order = ExecutionOrder::next();
        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let handle = ExecutionHandle::pending(identity.clone(), order, output_tx);
        let request = ExecutionRequest {
            raw_text: cell_text.to_string(),
            command,
            identity,
            order,
            handle: handle.clone(),
        };

        if let Err(mpsc::error::SendError(Event::Submit(request))) =
            self.events.send(Event::Submit(request))
        {
            reject_closed(&request);
        }

        Submission {
            handle,
            output: OutputStream::new(output_rx),
        }
    }

    /// Send input bytes to the execution of `identity`, if it is the active one.
    pub fn forward(&self, identity: &CellId, bytes: &[u8]) {
        let _ = self.events.send(Event::Forward {
            identity: identity.clone(),
            bytes: bytes.to_vec(),
        });
    }

    /// Change the terminal width for this and later output.
    pub fn resize(&self, columns: u16) {
        let _ = self.events.send(Event::Resize { columns });
    }

    /// Stop accepting work.
    ///
    /// Queued executions end with failure. The active one is interrupted
    /// and ends when its process settles.
    pub fn shutdown(&self) {
        let _ = self.events.send(Event::Shutdown);
    }
}

impl Drop for QueueManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn reject_closed(request: &ExecutionRequest) {
    let err = ClosedSnafu.build();
    warn!(
        order = %request.order,
        cell = %request.identity,
        status = %err.status_code(),
        "{err}"
    );
    request.handle.finish(false);
}

struct ActiveExecution {
    request: ExecutionRequest,
    transcript: Transcript,
    first_chunk: bool,
}

struct QueueActor {
    driver: Arc<dyn ProcessDriver>,
    transform: Arc<dyn CommandTransform>,
    /// Handed to runner tasks.
    events: mpsc::UnboundedSender<Event>,
    queue: VecDeque<ExecutionRequest>,
    active: Option<ActiveExecution>,
    cwd: Option<PathBuf>,
    closing: bool,
}

impl QueueActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Event>) {
        debug!("Queue actor started");
        while let Some(event) = rx.recv().await {
            match event {
                Event::Submit(request) => self.on_submit(request),
                Event::Forward { identity, bytes } => self.on_forward(&identity, &bytes),
                Event::Resize { columns } => {
                    debug!(columns, "Resize");
                    self.driver.set_columns(columns);
                }
                Event::Chunk { order, text } => self.on_chunk(order, text),
                Event::Completed { order, result } => self.on_completed(order, result),
                Event::Shutdown => self.on_shutdown(),
            }
            if self.closing && self.active.is_none() {
                break;
            }
        }
        debug!("Queue actor stopped");
    }

    fn on_submit(&mut self, request: ExecutionRequest) {
        if self.closing {
            reject_closed(&request);
            return;
        }
        debug!(
            order = %request.order,
            cell = %request.identity,
            command = %request.command,
            queued = self.queue.len(),
            "Enqueued"
        );
        self.queue.push_back(request);
        self.drain();
    }

    fn on_forward(&self, identity: &CellId, bytes: &[u8]) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if &active.request.identity != identity {
            return;
        }
        if let Err(err) = self.driver.write(bytes) {
            warn!(order = %active.request.order, error = %err, "Failed to forward input");
        }
    }

    fn on_chunk(&mut self, order: ExecutionOrder, text: String) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.request.order != order || active.request.handle.is_cancel_requested() {
            return;
        }
        let message = OutputMessage::data(
            active.request.identity.clone(),
            text.as_str(),
            active.first_chunk,
            self.driver.columns(),
        );
        active.request.emit(CellOutput::Message(message));
        active.transcript.push(&text);
        active.first_chunk = false;
    }

    fn on_completed(&mut self, order: ExecutionOrder, result: Result<CommandOutcome, DriverError>) {
        let Some(active) = self.active.take_if(|a| a.request.order == order) else {
            warn!(order = %order, "Completion for unknown execution");
            return;
        };

        let outcome = match &result {
            Ok(outcome) => Some(outcome),
            Err(err) => err.outcome(),
        };
        if let Some(cwd) = outcome.and_then(|o| o.cwd.clone()) {
            self.cwd = Some(cwd);
        }

        let request = &active.request;
        if !active.transcript.is_empty() {
            request.emit(CellOutput::Message(OutputMessage::finished(
                request.identity.clone(),
            )));
            request.emit(CellOutput::Replace(active.transcript.render()));
        }

        match &result {
            Ok(outcome) => info!(
                order = %order,
                cell = %request.identity,
                exit_code = outcome.exit_code,
                chunks = active.transcript.len(),
                "Execution succeeded"
            ),
            Err(err) => info!(
                order = %order,
                cell = %request.identity,
                exit_code = ?err.outcome().map(|o| o.exit_code),
                status = %err.status_code(),
                chunks = active.transcript.len(),
                "Execution failed: {err}"
            ),
        }
        request.handle.finish(result.is_ok());
        drop(active);

        self.drain();
    }

    fn on_shutdown(&mut self) {
        if self.closing {
            return;
        }
        self.closing = true;
        let dropped = self.queue.len();
        for request in self.queue.drain(..) {
            request.handle.finish(false);
        }
        info!(dropped, active = self.active.is_some(), "Queue shutting down");
        if let Some(active) = self.active.as_ref() {
            active.request.handle.cancel();
        }
    }

    /// Start the next runnable request if the shell is free.
    fn drain(&mut self) {
        if self.active.is_some() || self.closing {
            return;
        }
        while let Some(request) = self.queue.pop_front() {
            if !request.handle.start() {
                debug!(order = %request.order, "Skipping cancelled request");
                continue;
            }

            let ctx = ExecutionContext {
                identity: request.identity.clone(),
                order: request.order,
                cwd: self.cwd.clone(),
                raw_text: request.raw_text.clone(),
            };
            let command = match self.transform.transform(&request.command, &ctx) {
                Ok(command) => command,
                Err(err) => {
                    warn!(order = %request.order, cell = %request.identity, "Transform failed: {err}");
                    request.emit(CellOutput::Error(err.output_msg()));
                    request.handle.finish(false);
                    continue;
                }
            };

            debug!(order = %request.order, cell = %request.identity, command = %command, "Starting execution");
            self.spawn_runner(&request, command);
            self.active = Some(ActiveExecution {
                request,
                transcript: Transcript::new(),
                first_chunk: true,
            });
            return;
        }
    }

    /// Run `command` on the driver in its own task.
    ///
    /// `run` is polled before the cancellation branch, so the driver has
    /// registered the command by the time `terminate` is called. A cancel
    /// that lands before the first chunk still interrupts the process.
    fn spawn_runner(&self, request: &ExecutionRequest, command: String) {
        let driver = Arc::clone(&self.driver);
        let events = self.events.clone();
        let order = request.order;
        let identity = request.identity.clone();
        let cancel = request.handle.cancellation_token();
        tokio::spawn(async move {
            let (chunk_tx, mut chunk_rx) = mpsc::unbounded_channel();
            let run = driver.run_command(&command, chunk_tx);
            tokio::pin!(run);

            let mut interrupted = false;
            let result = loop {
                tokio::select! {
                    biased;
                    Some(text) = chunk_rx.recv() => {
                        let _ = events.send(Event::Chunk { order, text });
                    }
                    result = &mut run => break result,
                    _ = cancel.cancelled(), if !interrupted => {
                        info!(order = %order, cell = %identity, "Terminating active execution");
                        interrupted = true;
                        driver.terminate();
                    }
                }
            };
            while let Ok(text) = chunk_rx.try_recv() {
                let _ = events.send(Event::Chunk { order, text });
            }
            let _ = events.send(Event::Completed { order, result });
        });
    }
}

#[cfg(test)]
#[path = "manager.test.rs"]
mod tests;
