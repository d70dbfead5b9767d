//! Streaming output protocol.
//!
//! While a cell runs, each output chunk becomes one [`OutputMessage::Data`].
//! When the command settles after producing output, a single
//! [`OutputMessage::Finished`] is followed by a [`CellOutput::Replace`]
//! carrying the clean transcript, which supersedes everything streamed so far.

use serde::Deserialize;
use serde::Serialize;

use crate::cell::CellId;

/// One raw output chunk of a running execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMessage {
    pub identity: CellId,
    /// Raw chunk as produced by the process, escape sequences included.
    pub chunk: String,
    pub is_first_chunk_of_execution: bool,
    /// Terminal width at the moment this message was emitted.
    pub terminal_columns: u16,
}

/// Marks the end of an execution that produced output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedMessage {
    pub identity: CellId,
}

/// A message on the streaming output protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputMessage {
    Data(DataMessage),
    Finished(FinishedMessage),
}

impl OutputMessage {
    pub fn data(
        identity: CellId,
        chunk: impl Into<String>,
        is_first_chunk_of_execution: bool,
        terminal_columns: u16,
    ) -> Self {
        Self::Data(DataMessage {
            identity,
            chunk: chunk.into(),
            is_first_chunk_of_execution,
            terminal_columns,
        })
    }

    pub fn finished(identity: CellId) -> Self {
        Self::Finished(FinishedMessage { identity })
    }

    /// Identity of the cell this message belongs to.
    pub fn identity(&self) -> &CellId {
        match self {
            Self::Data(m) => &m.identity,
            Self::Finished(m) => &m.identity,
        }
    }
}

/// One item on a per-execution output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CellOutput {
    /// A protocol message.
    Message(OutputMessage),
    /// Plain-text transcript that replaces all previously emitted output.
    Replace(String),
    /// The command could not be prepared for execution.
    Error(String),
}

impl From<OutputMessage> for CellOutput {
    fn from(message: OutputMessage) -> Self {
        Self::Message(message)
    }
}

#[cfg(test)]
#[path = "output.test.rs"]
mod tests;
