//! bootcfg - container entrypoint that prepares the servers file, then execs the real command.

use anyhow::{Context as _, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

mod logging;

use bootcfg_core::{BootstrapEnv, DEFAULT_CONFIG_PATH, HostFs, Outcome, bootstrap, launch};

/// Prepare the servers configuration file and launch COMMAND.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Configuration file location (overrides `SERVERS_CONFIG_PATH`).
    #[arg(short = 'c', long = "config-path", value_name = "PATH")]
    config_path: Option<PathBuf>,

    /// Location the wrapped application reads its configuration from.
    #[arg(long = "default-path", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    default_path: PathBuf,

    /// Command to run once the configuration is in place.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    command: Vec<OsString>,
}

/// Initialize the logging system.
fn setup_logging() -> bool {
    let log_dir = std::env::var_os(logging::LOG_DIR_VAR)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from);

    match logging::init_logging(log_dir.as_deref()) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to initialize logging: {e:#}");
            false
        },
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let _logging_enabled = setup_logging();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Bootstrap the configuration file, then hand off to the command.
fn run(args: CliArgs) -> Result<ExitCode> {
    let mut env = BootstrapEnv::from_env();
    if let Some(path) = args.config_path {
        env.config_path = Some(path);
    }

    let outcome = bootstrap(&env, &HostFs, &args.default_path)
        .context("Failed to bootstrap configuration")?;
    log_outcome(&outcome);

    launch(&args.command).context("Failed to launch command")
}

/// Report what the bootstrap step did.
fn log_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::InPlace { path } => {
            tracing::info!(path = %path.display(), "Using existing configuration");
        },
        Outcome::Linked { target, link } => {
            tracing::info!(config = %target.display(), link = %link.display(), "Linked configuration");
        },
        Outcome::Synthesized { path, link } => {
            tracing::info!(
                path = %path.display(),
                linked = link.is_some(),
                "Generated configuration from environment"
            );
        },
        Outcome::Missing { path } => {
            tracing::debug!(path = %path.display(), "Continuing without configuration");
        },
    }
}
