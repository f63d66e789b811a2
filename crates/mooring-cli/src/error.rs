//! CLI error handling.

use std::process::ExitCode;

use mooring_common_config::{ConfigError, EnvError};
use mooring_sql::ConnectionsError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{0}")]
    Connection(#[source] ConnectionsError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        let code = match self {
            Self::Config { .. } => 2,
            Self::Connection(_) => 4,
            Self::Other(_) => 1,
        };
        ExitCode::from(code)
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<EnvError> for CliError {
    fn from(err: EnvError) -> Self {
        Self::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<ConnectionsError> for CliError {
    fn from(err: ConnectionsError) -> Self {
        match err {
            ConnectionsError::MissingDataSource => Self::config(format!(
                "{err}; set sql.data_source or MOORING_SQL_DATASOURCE"
            )),
            other => Self::Connection(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mooring_sql::{PingError, SetupError, PING_TIMEOUT};

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::config("bad").exit_code(), ExitCode::from(2));
        assert_eq!(
            CliError::Other(anyhow::anyhow!("boom")).exit_code(),
            ExitCode::from(1)
        );

        let err = CliError::from(ConnectionsError::Setup {
            role: "master".to_string(),
            source: SetupError::Ping(PingError::TimedOut(PING_TIMEOUT)),
        });
        assert_eq!(err.exit_code(), ExitCode::from(4));
    }

    #[test]
    fn test_missing_data_source_is_a_config_error() {
        let err = CliError::from(ConnectionsError::MissingDataSource);
        assert!(matches!(err, CliError::Config { .. }));
        assert!(err.to_string().contains("MOORING_SQL_DATASOURCE"));
    }
}
