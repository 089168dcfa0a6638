//! Logging initialization for bootcfg.

use anyhow::{Context as _, Result};
use std::io::IsTerminal as _;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Environment variable naming an optional log file directory.
pub const LOG_DIR_VAR: &str = "BOOTCFG_LOG_DIR";

/// Initialize the tracing subscriber.
///
/// Console output goes to stderr so it never mixes with the wrapped
/// command's stdout, with colors only when stderr is a terminal. By default
/// only WARN and ERROR are shown; set `RUST_LOG` to see more:
///
/// ```sh
/// RUST_LOG=debug bootcfg -- python main.py
/// ```
///
/// When `log_dir` is given, events are also appended to a daily-rotated
/// `bootcfg.log` in that directory. Writes are blocking so nothing is lost
/// when the process image is replaced.
///
/// The console layer is installed even when the log file cannot be opened.
///
/// # Errors
///
/// Returns an error if:
/// - Log file cannot be opened (console logging is still active)
/// - Subscriber cannot be set as global default
pub fn init_logging(log_dir: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    let (file_appender, file_error) = match log_dir.map(open_log_file).transpose() {
        Ok(appender) => (appender, None),
        Err(e) => (None, Some(e)),
    };

    let file_layer = file_appender.map(|appender| {
        fmt::layer()
            .with_writer(appender)
            .with_ansi(false)
            .with_target(false)
            .boxed()
    });

    let subscriber = Registry::default()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .event_format(fmt::format().compact()),
        )
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)?;

    match file_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Open the daily-rotated log file in `dir`, creating the directory if needed.
fn open_log_file(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("bootcfg.log")
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}
