//! Submitted cell runs.

use shellbook_protocol::CellId;
use shellbook_protocol::CellOutput;
use shellbook_protocol::ExecutionOrder;

use crate::handle::ExecutionHandle;

/// Separator placed between the statements of one cell.
pub const STATEMENT_SEPARATOR: &str = "; ";

/// Turn multi-line cell text into one command line.
///
/// Lines are trimmed, blank lines dropped and the rest joined with `"; "`.
/// Returns `None` when nothing runnable remains.
pub fn normalize_cell_text(text: &str) -> Option<String> {
    let statements: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if statements.is_empty() {
        None
    } else {
        Some(statements.join(STATEMENT_SEPARATOR))
    }
}

/// One queued run of a cell.
#[derive(Debug)]
pub struct ExecutionRequest {
    /// Text exactly as submitted.
    pub raw_text: String,
    /// Normalized command line.
    pub command: String,
    pub identity: CellId,
    pub order: ExecutionOrder,
    pub handle: ExecutionHandle,
}

impl ExecutionRequest {
    /// Emit an item on this execution's output stream.
    pub(crate) fn emit(&self, item: CellOutput) {
        self.handle.emit(item);
    }
}

#[cfg(test)]
#[path = "request.test.rs"]
mod tests;
