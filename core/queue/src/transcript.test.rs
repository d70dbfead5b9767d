use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_empty_transcript() {
    let transcript = Transcript::new();
    assert!(transcript.is_empty());
    assert_eq!(transcript.render(), "");
}

#[test]
fn test_chunks_are_stripped_and_joined() {
    let mut transcript = Transcript::new();
    transcript.push("\u{1b}[32mok\u{1b}[0m");
    transcript.push("plain");
    transcript.push("\u{1b}[1mbold\u{1b}[22m tail");
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript.render(), "ok\nplain\nbold tail");
}

#[test]
fn test_render_is_stable_under_restrip() {
    let mut transcript = Transcript::new();
    transcript.push("\u{1b}[31mred\u{1b}[0m");
    let once = transcript.render();
    assert_eq!(shellbook_utils_ansi::strip(&once), once);
}
