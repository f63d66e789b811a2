//! Environment variable handling.

use crate::types::MooringConfig;
use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    // Configuration
    pub const MOORING_CONFIG: &str = "MOORING_CONFIG";
    pub const MOORING_ENV: &str = "MOORING_ENV";

    // SQL overrides
    pub const MOORING_SQL_DRIVER: &str = "MOORING_SQL_DRIVER";
    pub const MOORING_SQL_DATASOURCE: &str = "MOORING_SQL_DATASOURCE";
    pub const MOORING_SQL_ATTEMPTS: &str = "MOORING_SQL_ATTEMPTS";
}

/// Environment configuration.
pub struct Environment {
    _guard: (), // Prevent construction outside module
}

impl Environment {
    /// Initialize environment from .env files.
    pub fn init() -> Self {
        // Later files override earlier ones
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");

        if let Ok(env) = env::var(vars::MOORING_ENV) {
            let _ = dotenvy::from_filename(format!(".env.{}", env));
        }

        Self { _guard: () }
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get an integer variable.
    pub fn get_int<T: std::str::FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match env::var(var) {
            Ok(v) => v.parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: "expected integer".to_string(),
            }),
            Err(_) => Ok(None),
        }
    }

    /// Apply `MOORING_SQL_*` overrides on top of a loaded configuration.
    pub fn apply_overrides(config: &mut MooringConfig) -> Result<(), EnvError> {
        if let Some(driver) = Self::get(vars::MOORING_SQL_DRIVER) {
            config.sql.driver_name = driver;
        }

        if let Some(data_source) = Self::get(vars::MOORING_SQL_DATASOURCE) {
            config.sql.data_source = data_source;
        }

        if let Some(attempts) = Self::get_int::<u32>(vars::MOORING_SQL_ATTEMPTS)? {
            config.sql.connection_attempts = attempts;
        }

        Ok(())
    }
}
