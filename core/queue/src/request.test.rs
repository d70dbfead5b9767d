use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_joins_lines_with_separator() {
    assert_eq!(
        normalize_cell_text("echo a\n\necho b"),
        Some("echo a; echo b".to_string())
    );
}

#[test]
fn test_trims_each_line() {
    assert_eq!(
        normalize_cell_text("  cd /tmp  \n\t ls -la\t\n"),
        Some("cd /tmp; ls -la".to_string())
    );
}

#[test]
fn test_single_line_is_unchanged() {
    assert_eq!(normalize_cell_text("pwd"), Some("pwd".to_string()));
}

#[test]
fn test_blank_text_is_empty() {
    assert_eq!(normalize_cell_text(""), None);
    assert_eq!(normalize_cell_text("\n"), None);
    assert_eq!(normalize_cell_text("   \n\t\n  "), None);
}

#[test]
fn test_carriage_returns_are_trimmed() {
    assert_eq!(
        normalize_cell_text("echo a\r\necho b\r\n"),
        Some("echo a; echo b".to_string())
    );
}
