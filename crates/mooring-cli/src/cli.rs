//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use mooring_common_config::{validate, ConfigLoader, Environment, MooringConfig};
use mooring_common_log::LogLevel;

use crate::commands::CheckCommand;
use crate::error::CliError;

/// Mooring - SQL connection pool setup
///
/// Opens every configured pool, waits until each database answers and
/// reports the limits applied to it.
#[derive(Debug, Parser)]
#[command(
    name = "mooring",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase verbosity level"
    )]
    pub verbose: u8,

    /// Suppress reports and all log output except errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Suppress reports and non-error log output"
    )]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "MOORING_CONFIG",
        value_hint = ValueHint::FilePath,
        help = "Path to configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_enum,
        help = "Output format (text, json)"
    )]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set up every configured SQL connection and report its pool limits
    Check(CheckCommand),
}

impl Cli {
    /// Log level implied by `-v` / `-q`, if either was given.
    pub fn log_level(&self) -> Option<LogLevel> {
        match self.verbose {
            0 if self.quiet => Some(LogLevel::Error),
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }

    /// Load the config file, apply `MOORING_SQL_*` overrides and validate.
    pub fn load_config(&self) -> Result<MooringConfig, CliError> {
        let loader = match &self.config {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                ConfigLoader::from_file(path)
            }
            None => ConfigLoader::default(),
        };

        let mut config = loader.load()?;
        Environment::apply_overrides(&mut config)?;
        validate(&config)?;

        tracing::debug!(path = %loader.path().display(), "Loaded configuration");
        Ok(config)
    }

    /// Execute the selected command
    pub async fn execute(self, config: MooringConfig) -> Result<(), CliError> {
        match self.command {
            Command::Check(cmd) => cmd.execute(config, self.format, self.quiet).await,
        }
    }
}
