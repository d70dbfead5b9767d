//! The process driver interface consumed by the execution queue.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::Result;

/// Receives output chunks of the running command, in production order.
pub type ChunkSender = mpsc::UnboundedSender<String>;

/// How a command settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Shell working directory after the command, when known.
    pub cwd: Option<PathBuf>,
    pub exit_code: i32,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A long-lived shell that runs one command line at a time.
///
/// Shell state (working directory, variables, functions) persists between
/// commands. Implementations must tolerate `write`, `terminate` and
/// `set_columns` being called while `run_command` is pending.
#[async_trait]
pub trait ProcessDriver: Send + Sync {
    /// Forward raw bytes to the running command's input. Never blocks.
    fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Run `command_line` to completion, sending every output chunk on
    /// `chunks` before returning.
    ///
    /// Resolves `Ok` on exit status zero and
    /// [`DriverError::CommandFailed`](crate::DriverError::CommandFailed)
    /// otherwise.
    async fn run_command(&self, command_line: &str, chunks: ChunkSender) -> Result<CommandOutcome>;

    /// Interrupt the foreground command. The shell itself survives.
    fn terminate(&self);

    fn set_columns(&self, columns: u16);

    fn columns(&self) -> u16;
}
