use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_no_separator_is_one_cell() {
    assert_eq!(split_cells("echo a\necho b\n", DEFAULT_SEPARATOR), vec!["echo a\necho b"]);
}

#[test]
fn test_split_on_separator_lines() {
    let text = "\
# %% setup
cd /tmp

# %%
ls
  # %% indented
echo done
";
    assert_eq!(
        split_cells(text, DEFAULT_SEPARATOR),
        vec!["cd /tmp\n", "ls", "echo done"]
    );
}

#[test]
fn test_blank_cells_are_skipped() {
    let text = "# %%\n\n   \n# %%\n# %%\necho only\n";
    assert_eq!(split_cells(text, DEFAULT_SEPARATOR), vec!["echo only"]);
}

#[test]
fn test_custom_separator() {
    assert_eq!(split_cells("a\n---\nb", "---"), vec!["a", "b"]);
}

#[test]
fn test_empty_input() {
    assert!(split_cells("", DEFAULT_SEPARATOR).is_empty());
}
