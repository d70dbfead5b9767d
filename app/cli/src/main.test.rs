use super::*;
use std::collections::BTreeMap;
use clap::CommandFactory;
use pretty_assertions::assert_eq;

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_var() {
    assert_eq!(
        parse_var("name=a=b"),
        Ok(("name".to_string(), "a=b".to_string()))
    );
    assert_eq!(parse_var("empty="), Ok(("empty".to_string(), String::new())));
    assert!(parse_var("novalue").is_err());
    assert!(parse_var("=x").is_err());
}

#[test]
fn test_exec_flags_override_config() {
    let cli = Cli::try_parse_from([
        "shellbook",
        "exec",
        "--shell",
        "/bin/zsh",
        "--columns",
        "100",
        "--var",
        "a=1",
        "--var",
        "b=2",
        "echo {{ a }}",
    ])
    .unwrap();
    let Command::Exec { cells, options } = cli.command else {
        panic!("expected exec");
    };
    assert_eq!(cells, vec!["echo {{ a }}"]);

    let mut config = AppConfig::default();
    config.variables.insert("a".to_string(), "0".to_string());
    options.apply(&mut config);
    assert_eq!(config.shell.program, Some(PathBuf::from("/bin/zsh")));
    assert_eq!(config.terminal.columns, 100);
    assert_eq!(
        config.variables,
        BTreeMap::from([
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ])
    );
}

#[test]
fn test_run_defaults() {
    let cli = Cli::try_parse_from(["shellbook", "-v", "run", "book.sh", "--json"]).unwrap();
    assert!(cli.verbose);
    let Command::Run {
        file,
        separator,
        options,
    } = cli.command
    else {
        panic!("expected run");
    };
    assert_eq!(file, PathBuf::from("book.sh"));
    assert_eq!(separator, DEFAULT_SEPARATOR);
    assert_eq!(options.render_mode(), RenderMode::Json);
}

#[test]
fn test_exec_requires_a_cell() {
    assert!(Cli::try_parse_from(["shellbook", "exec"]).is_err());
}
