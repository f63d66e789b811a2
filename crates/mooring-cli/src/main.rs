//! Mooring CLI
//!
//! Main entry point for the `mooring` binary.

use std::process::ExitCode;

use clap::Parser;
use mooring_common_config::Environment;
use mooring_common_log::LogConfig;

mod cli;
mod commands;
mod error;

use cli::Cli;
use error::CliError;

fn main() -> ExitCode {
    let _env = Environment::init();
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if let Some(level) = cli.log_level() {
        log_config.level = level;
    }
    if let Err(e) = mooring_common_log::init(log_config) {
        eprintln!("warning: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.load_config()?;
    cli.execute(config).await
}
