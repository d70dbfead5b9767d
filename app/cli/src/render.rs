//! Terminal and JSON rendering of cell output.

use std::io;
use std::io::Write;

use serde::Serialize;
use shellbook_protocol::CellId;
use shellbook_protocol::CellOutput;
use shellbook_protocol::ExecutionOrder;
use shellbook_protocol::OutputMessage;
use shellbook_queue::ExecutionHandle;
use shellbook_utils_common::format_millis;

/// How cell output reaches stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Raw chunks, escape sequences included.
    Live,
    /// Chunks with escape sequences and carriage returns removed.
    Plain,
    /// One JSON object per line.
    Json,
}

/// How one cell ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSummary {
    pub identity: CellId,
    pub order: Option<ExecutionOrder>,
    pub success: bool,
    pub duration_ms: Option<i64>,
}

impl CellSummary {
    pub fn from_handle(handle: &ExecutionHandle) -> Self {
        let state = handle.state();
        Self {
            identity: handle.identity().clone(),
            order: handle.order(),
            success: state.success().unwrap_or(false),
            duration_ms: state.duration().map(|d| d.num_milliseconds()),
        }
    }

    fn status_line(&self) -> String {
        let order = self
            .order
            .map_or_else(|| "-".to_string(), |order| order.to_string());
        let status = if self.success { "ok" } else { "failed" };
        match self.duration_ms {
            Some(ms) => format!("[{order}] {status} in {}", format_millis(ms)),
            None => format!("[{order}] {status}"),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
enum SummaryLine<'a> {
    Ended(&'a CellSummary),
}

pub struct Renderer<W> {
    out: W,
    mode: RenderMode,
    at_line_start: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, mode: RenderMode) -> Self {
        Self {
            out,
            mode,
            at_line_start: true,
        }
    }

    pub fn item(&mut self, item: &CellOutput) -> io::Result<()> {
        if self.mode == RenderMode::Json {
            serde_json::to_writer(&mut self.out, item)?;
            writeln!(self.out)?;
            return self.out.flush();
        }

        match item {
            CellOutput::Message(OutputMessage::Data(data)) => {
                if self.mode == RenderMode::Plain {
                    let text = if shellbook_utils_ansi::has_escapes(&data.chunk) {
                        shellbook_utils_ansi::strip(&data.chunk)
                    } else {
                        data.chunk.clone()
                    };
                    self.write_text(&text.replace('\r', ""))?;
                } else {
                    self.write_text(&data.chunk)?;
                }
            }
            CellOutput::Error(message) => {
                self.end_line()?;
                writeln!(self.out, "error: {message}")?;
            }
            // Live output is already on screen; the transcript adds nothing.
            CellOutput::Message(OutputMessage::Finished(_)) | CellOutput::Replace(_) => {}
        }
        self.out.flush()
    }

    pub fn summary(&mut self, summary: &CellSummary) -> io::Result<()> {
        if self.mode == RenderMode::Json {
            serde_json::to_writer(&mut self.out, &SummaryLine::Ended(summary))?;
        } else {
            self.end_line()?;
            write!(self.out, "{}", summary.status_line())?;
        }
        writeln!(self.out)?;
        self.at_line_start = true;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.out.write_all(text.as_bytes())?;
        self.at_line_start = text.ends_with('\n');
        Ok(())
    }

    fn end_line(&mut self) -> io::Result<()> {
        if !self.at_line_start {
            writeln!(self.out)?;
            self.at_line_start = true;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "render.test.rs"]
mod tests;
