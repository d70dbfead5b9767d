use super::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

use crate::render::RenderMode;

#[test]
fn test_shell_options_follow_config() {
    let mut config = AppConfig::default();
    config.shell.program = Some(PathBuf::from("/bin/bash"));
    config.shell.args = vec!["--norc".to_string()];
    config.terminal.columns = 120;
    config.shell.startup_timeout_ms = 250;

    let options = shell_options(&config);
    assert_eq!(options.program, PathBuf::from("/bin/bash"));
    assert_eq!(options.args, vec!["--norc"]);
    assert_eq!(options.columns, 120);
    assert_eq!(options.startup_timeout, Duration::from_millis(250));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_cells_against_bash() {
    let Some(bash) = which_bash() else { return };
    let mut config = AppConfig::default();
    config.shell.program = Some(bash);
    config.shell.startup_timeout_ms = 10_000;
    config
        .variables
        .insert("who".to_string(), "cells".to_string());

    let cells = vec![
        "export GREETING=hello".to_string(),
        "echo \"$GREETING {{ who }}\"".to_string(),
        "(exit 4)".to_string(),
    ];
    let mut renderer = Renderer::new(Vec::new(), RenderMode::Plain);
    let all_succeeded = run(&config, &cells, &mut renderer).await.unwrap();
    assert!(!all_succeeded);

    let text = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(text.contains("hello cells"), "{text:?}");
    assert_eq!(text.matches(" ok").count(), 2, "{text:?}");
    assert_eq!(text.matches(" failed").count(), 1, "{text:?}");
}

fn which_bash() -> Option<PathBuf> {
    ["/bin/bash", "/usr/bin/bash"]
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}
