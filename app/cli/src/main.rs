//! `shellbook`: run shell cells one after another in a single shell session.

mod cells;
mod logging;
mod render;
mod runner;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use shellbook_config::AppConfig;
use tracing::info;

use crate::cells::DEFAULT_SEPARATOR;
use crate::render::RenderMode;
use crate::render::Renderer;

#[derive(Parser)]
#[command(name = "shellbook", version)]
#[command(about = "Run shell cells against one persistent shell")]
struct Cli {
    /// Log debug output to the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every cell of a notebook file
    Run {
        /// File whose cells are separated by separator lines
        file: PathBuf,

        /// Line prefix that starts a new cell
        #[arg(long, default_value = DEFAULT_SEPARATOR)]
        separator: String,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Run each argument as one cell
    Exec {
        #[arg(required = true)]
        cells: Vec<String>,

        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(Args)]
struct RunOptions {
    /// Print every output item as a JSON line
    #[arg(long)]
    json: bool,

    /// Shell program (default: config, then $SHELL)
    #[arg(long)]
    shell: Option<PathBuf>,

    /// Terminal width reported to commands
    #[arg(long)]
    columns: Option<u16>,

    /// Template variable, usable as {{ KEY }} in cells
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,
}

impl RunOptions {
    /// Flags take precedence over the config file and environment.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(shell) = &self.shell {
            config.shell.program = Some(shell.clone());
        }
        if let Some(columns) = self.columns.filter(|c| *c > 0) {
            config.terminal.columns = columns;
        }
        config.variables.extend(self.vars.iter().cloned());
    }

    fn render_mode(&self) -> RenderMode {
        if self.json {
            RenderMode::Json
        } else if std::io::stdout().is_terminal() {
            RenderMode::Live
        } else {
            RenderMode::Plain
        }
    }
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = shellbook_config::load().context("failed to load configuration")?;
    let (cells, options) = match cli.command {
        Command::Run {
            file,
            separator,
            options,
        } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            (cells::split_cells(&text, &separator), options)
        }
        Command::Exec { cells, options } => (cells, options),
    };
    options.apply(&mut config);

    let _log_guard = logging::init(&config, cli.verbose);
    info!(
        cells = cells.len(),
        variables = ?config.variables.keys().collect::<Vec<_>>(),
        "Starting shellbook"
    );

    let mut renderer = Renderer::new(std::io::stdout().lock(), options.render_mode());
    let all_succeeded = runner::run(&config, &cells, &mut renderer).await?;
    Ok(if all_succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
#[path = "main.test.rs"]
mod tests;
