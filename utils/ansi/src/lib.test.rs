use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_strip_color_codes() {
    assert_eq!(strip("\u{1b}[31mred\u{1b}[0m plain"), "red plain");
    assert_eq!(strip("\u{1b}[1;32mbold green\u{1b}[m"), "bold green");
}

#[test]
fn test_strip_cursor_and_erase_sequences() {
    assert_eq!(strip("a\u{1b}[2Kb\u{1b}[1Ac"), "abc");
    assert_eq!(strip("\u{1b}]0;window title\u{7}prompt"), "prompt");
}

#[test]
fn test_strip_keeps_plain_text() {
    let text = "hello world\n\tindented line";
    assert_eq!(strip(text), text);
}

#[test]
fn test_strip_keeps_utf8() {
    assert_eq!(strip("héllo wörld ✓ 日本"), "héllo wörld ✓ 日本");
    assert_eq!(strip("\u{1b}[33m✓\u{1b}[0m done"), "✓ done");
}

#[test]
fn test_strip_is_idempotent() {
    let samples = [
        "",
        "plain",
        "\u{1b}[31mred\u{1b}[0m",
        "\u{1b}[38;5;208morange\u{1b}[0m and \u{1b}[4munderline\u{1b}[24m",
        "mixed ✓ \u{1b}[1mbold\u{1b}[22m\nsecond line",
    ];
    for sample in samples {
        let once = strip(sample);
        let twice = strip(&once);
        assert_eq!(once, twice, "not idempotent for {sample:?}");
    }
}

#[test]
fn test_strip_bytes_invalid_utf8_is_lossy() {
    let out = strip_bytes(b"ok\xffok");
    assert!(out.starts_with("ok"));
    assert!(out.ends_with("ok"));
}

#[test]
fn test_has_escapes() {
    assert!(has_escapes("\u{1b}[0m"));
    assert!(!has_escapes("plain"));
}
