//! File logging for the binary.

use std::fs::OpenOptions;

use shellbook_config::AppConfig;
use shellbook_utils_common::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const LOG_FILE_NAME: &str = "shellbook.log";

/// Level used by `--verbose`.
const VERBOSE_LEVEL: &str = "info,shellbook=debug";

/// Install the file logger.
///
/// Logs go to `<log dir>/shellbook.log`, never to the terminal, so they
/// cannot interleave with cell output. Returns `None` (after a warning on
/// stderr) when the file cannot be opened. The guard must be held until
/// exit so buffered records get flushed.
pub fn init(config: &AppConfig, verbose: bool) -> Option<WorkerGuard> {
    let logging = effective_logging(config, verbose);

    let log_dir = shellbook_config::log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory {log_dir:?}: {e}");
        return None;
    }

    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);
    let log_file = match log_file_opts.open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {log_path:?}: {e}");
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let file_layer = shellbook_utils_common::configure_fmt_layer!(
        fmt::layer().with_writer(non_blocking).with_ansi(false),
        &logging,
        "info"
    );

    match tracing_subscriber::registry().with(file_layer).try_init() {
        Ok(()) => Some(guard),
        Err(_) => None, // Already initialized
    }
}

fn effective_logging(config: &AppConfig, verbose: bool) -> LoggingConfig {
    let logging = config.logging.to_common_logging();
    if verbose {
        LoggingConfig {
            level: VERBOSE_LEVEL.to_string(),
            ..logging
        }
    } else {
        logging
    }
}

#[cfg(test)]
#[path = "logging.test.rs"]
mod tests;
