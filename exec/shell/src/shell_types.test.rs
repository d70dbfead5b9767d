use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_detect_shell_type_simple() {
    assert_eq!(
        detect_shell_type(&PathBuf::from("zsh")),
        Some(ShellType::Zsh)
    );
    assert_eq!(
        detect_shell_type(&PathBuf::from("bash")),
        Some(ShellType::Bash)
    );
    assert_eq!(detect_shell_type(&PathBuf::from("fish")), None);
    assert_eq!(detect_shell_type(&PathBuf::from("pwsh")), None);
    assert_eq!(detect_shell_type(&PathBuf::from("other")), None);
}

#[test]
fn test_detect_shell_type_full_path() {
    assert_eq!(
        detect_shell_type(&PathBuf::from("/bin/zsh")),
        Some(ShellType::Zsh)
    );
    assert_eq!(
        detect_shell_type(&PathBuf::from("/usr/local/bin/bash")),
        Some(ShellType::Bash)
    );
    assert_eq!(
        detect_shell_type(&PathBuf::from("/bin/sh")),
        Some(ShellType::Sh)
    );
    assert_eq!(
        detect_shell_type(&PathBuf::from("/usr/bin/dash")),
        Some(ShellType::Sh)
    );
}

#[test]
fn test_shell_name() {
    let shells = [
        (ShellType::Zsh, "zsh"),
        (ShellType::Bash, "bash"),
        (ShellType::Sh, "sh"),
    ];
    for (shell_type, expected_name) in shells {
        assert_eq!(shell_type.name(), expected_name);
    }
}

#[test]
fn test_prompt_hook_support() {
    assert!(ShellType::Bash.has_prompt_hook());
    assert!(ShellType::Zsh.has_prompt_hook());
    assert!(!ShellType::Sh.has_prompt_hook());
}

#[test]
fn test_default_args() {
    assert_eq!(
        ShellType::Bash.default_args(),
        vec!["--noprofile", "--norc", "--noediting", "-i"]
    );
    assert_eq!(ShellType::Zsh.default_args(), vec!["-f", "-i"]);
}

#[test]
fn test_marker_command() {
    let cmd = ShellType::Bash.marker_command("abc");
    assert_eq!(
        cmd,
        "__sb_rc=$?; stty -echo 2>/dev/null; printf '\\036SB%s;%s;%s\\036' 'abc' \"$__sb_rc\" \"$PWD\""
    );
}

#[test]
fn test_bash_setup_quotes_hook() {
    let script = ShellType::Bash.setup_script("n1");
    assert!(script.starts_with(' '));
    assert!(script.ends_with('\n'));
    assert!(script.contains("PROMPT_COMMAND='__sb_rc=$?;"));
    assert!(script.contains("'\\''n1'\\''"));
}

#[test]
fn test_zsh_setup_defines_precmd() {
    let script = ShellType::Zsh.setup_script("n1");
    assert!(script.contains("precmd() { __sb_rc=$?;"));
    assert!(script.contains("unsetopt zle"));
}

#[test]
fn test_command_line_with_hook() {
    assert_eq!(
        ShellType::Bash.command_line("echo a; echo b", "n1"),
        " stty echo 2>/dev/null; echo a; echo b\n"
    );
}

#[test]
fn test_command_line_groups_multiline() {
    assert_eq!(
        ShellType::Zsh.command_line("echo a\necho b", "n1"),
        " stty echo 2>/dev/null; {\necho a\necho b\n}\n"
    );
}

#[test]
fn test_command_line_without_hook_appends_marker() {
    let line = ShellType::Sh.command_line("ls", "n1");
    assert!(line.starts_with(" stty echo 2>/dev/null; {\nls\n}; __sb_rc=$?;"));
    assert!(line.ends_with("\"$PWD\"\n"));
}

#[test]
fn test_command_line_without_hook_isolates_trailing_syntax() {
    let marker = ShellType::Sh.marker_command("n1");
    for command in ["echo a;", "sleep 1 &", "echo a # note"] {
        assert_eq!(
            ShellType::Sh.command_line(command, "n1"),
            format!(" stty echo 2>/dev/null; {{\n{command}\n}}; {marker}\n")
        );
    }
}
