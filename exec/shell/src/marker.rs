//! Completion-marker detection in the shell's output stream.
//!
//! After every command the shell prints `\x1eSB<nonce>;<status>;<pwd>\x1e`.
//! [`MarkerScanner`] removes these markers from the text it is fed and
//! reports them separately. A marker may arrive split across any number of
//! reads, so any suffix that could still turn into a marker is held back.

use std::path::PathBuf;

const RECORD_SEPARATOR: char = '\u{1e}';

/// Unterminated markers longer than this are treated as plain output.
const MAX_MARKER_LEN: usize = 8 * 1024;

/// A parsed completion marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub exit_code: i32,
    pub cwd: Option<PathBuf>,
}

/// One piece of scanned output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Output(String),
    Marker(Marker),
}

#[derive(Debug)]
pub struct MarkerScanner {
    /// `\x1eSB<nonce>;`
    prefix: String,
    buffer: String,
}

impl MarkerScanner {
    pub fn new(nonce: &str) -> Self {
        Self {
            prefix: format!("{RECORD_SEPARATOR}SB{nonce};"),
            buffer: String::new(),
        }
    }

    /// Feed decoded text and collect the resulting events in order.
    pub fn feed(&mut self, text: &str) -> Vec<ScanEvent> {
        self.buffer.push_str(text);
        let mut events = Vec::new();

        loop {
            let Some(start) = self.buffer.find(&self.prefix) else {
                let keep = self.partial_prefix_len();
                let emit_len = self.buffer.len() - keep;
                push_output(&mut events, self.buffer.drain(..emit_len).collect());
                break;
            };

            let body_start = start + self.prefix.len();
            let Some(body_len) = self.buffer[body_start..].find(RECORD_SEPARATOR) else {
                if self.buffer.len() - start > MAX_MARKER_LEN {
                    // Not a marker after all; release it as text.
                    push_output(&mut events, std::mem::take(&mut self.buffer));
                } else {
                    push_output(&mut events, self.buffer.drain(..start).collect());
                }
                break;
            };

            push_output(&mut events, self.buffer[..start].to_string());
            let marker = parse_body(&self.buffer[body_start..body_start + body_len]);
            events.push(ScanEvent::Marker(marker));
            self.buffer
                .drain(..body_start + body_len + RECORD_SEPARATOR.len_utf8());
        }

        events
    }

    /// Release any held-back text, e.g. when the shell exits.
    pub fn flush(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    /// Length of the longest buffer suffix that is a proper prefix of the
    /// marker prefix.
    fn partial_prefix_len(&self) -> usize {
        let max = self.prefix.len().saturating_sub(1).min(self.buffer.len());
        (1..=max)
            .rev()
            .find(|&len| {
                let tail_start = self.buffer.len() - len;
                self.buffer.is_char_boundary(tail_start)
                    && self.prefix.starts_with(&self.buffer[tail_start..])
            })
            .unwrap_or(0)
    }
}

fn push_output(events: &mut Vec<ScanEvent>, text: String) {
    if !text.is_empty() {
        events.push(ScanEvent::Output(text));
    }
}

/// Parse `<status>;<pwd>`. The cwd may itself contain `;`.
fn parse_body(body: &str) -> Marker {
    let (code, cwd) = body.split_once(';').unwrap_or((body, ""));
    Marker {
        exit_code: code.trim().parse().unwrap_or(-1),
        cwd: if cwd.is_empty() {
            None
        } else {
            Some(PathBuf::from(cwd))
        },
    }
}

#[cfg(test)]
#[path = "marker.test.rs"]
mod tests;
