/// ANSI-stripped output of the active execution.
#[derive(Debug, Default)]
pub struct Transcript {
    chunks: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw chunk; escape sequences are removed here.
    pub fn push(&mut self, raw_chunk: &str) {
        self.chunks.push(shellbook_utils_ansi::strip(raw_chunk));
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// The stripped chunks joined with `\n`.
    pub fn render(&self) -> String {
        self.chunks.join("\n")
    }
}

#[cfg(test)]
#[path = "transcript.test.rs"]
mod tests;
