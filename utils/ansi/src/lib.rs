//! ANSI escape stripping for terminal output.
//!
//! Raw chunks keep their escape sequences for live display. These helpers
//! produce the plain text used for transcripts and non-terminal renderers.

/// Remove ANSI escape and color control sequences from `text`.
///
/// Printable characters outside an escape sequence are kept, including
/// multi-byte UTF-8. Stripping already-stripped text is a no-op.
pub fn strip(text: &str) -> String {
    strip_bytes(text.as_bytes())
}

/// Like [`strip`], for raw bytes. Invalid UTF-8 is replaced lossily.
pub fn strip_bytes(bytes: &[u8]) -> String {
    let stripped = strip_ansi_escapes::strip(bytes);
    String::from_utf8_lossy(&stripped).into_owned()
}

/// Whether `text` contains an escape character.
pub fn has_escapes(text: &str) -> bool {
    text.contains('\u{1b}')
}

#[cfg(test)]
#[path = "lib.test.rs"]
mod tests;
