//! Configuration file loading and parsing.

use crate::types::{MooringConfig, SUPPORTED_DRIVERS};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for `.mooring/config.yaml` under the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            config_path: project_dir.as_ref().join(".mooring/config.yaml"),
        }
    }

    /// Create a loader for an explicit config file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Path this loader reads from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration. A missing file yields the defaults.
    pub fn load(&self) -> Result<MooringConfig, ConfigError> {
        if !self.config_path.exists() {
            return Ok(MooringConfig::default());
        }

        let contents = std::fs::read_to_string(&self.config_path)?;
        self.parse(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn parse(&self, contents: &str) -> Result<MooringConfig, ConfigError> {
        let expanded = self.expand_env_vars(contents)?;

        let config: MooringConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| {
            ConfigError::ValidationError {
                message: e.to_string(),
            }
        })?;

        let mut result = String::with_capacity(content.len());
        let mut last = 0;

        for cap in re.captures_iter(content) {
            let Some(full_match) = cap.get(0) else {
                continue;
            };
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result.push_str(&content[last..full_match.start()]);
            result.push_str(&value);
            last = full_match.end();
        }

        result.push_str(&content[last..]);
        Ok(result)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Validate configuration values.
pub fn validate(config: &MooringConfig) -> Result<(), ConfigError> {
    if !config.sql.is_supported_driver() {
        return Err(ConfigError::ValidationError {
            message: format!(
                "sql.driver_name must be one of {}, got {:?}",
                SUPPORTED_DRIVERS.join(", "),
                config.sql.driver_name
            ),
        });
    }

    if config.sql.connection_attempts == 0 {
        return Err(ConfigError::ValidationError {
            message: "sql.connection_attempts must be greater than 0".to_string(),
        });
    }

    Ok(())
}
