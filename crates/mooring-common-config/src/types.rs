//! Configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// PostgreSQL driver name.
pub const DRIVER_POSTGRES: &str = "postgres";
/// MySQL driver name.
pub const DRIVER_MYSQL: &str = "mysql";

/// Driver names accepted in `sql.driver_name`.
pub const SUPPORTED_DRIVERS: &[&str] = &[DRIVER_POSTGRES, DRIVER_MYSQL];

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MooringConfig {
    /// SQL connection settings.
    pub sql: SqlSettings,
}

/// SQL connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlSettings {
    /// Driver used to open connections (`postgres` or `mysql`).
    pub driver_name: String,
    /// Primary data source.
    pub data_source: String,
    /// Read replica data sources.
    pub data_source_replicas: Vec<String>,
    /// Search replica data sources.
    pub data_source_search_replicas: Vec<String>,
    /// Replica lag probe connections.
    pub replica_lag_settings: Vec<ReplicaLagSettings>,
    /// Maximum idle connections kept in each pool.
    pub max_idle_conns: u32,
    /// Maximum open connections per pool. Zero means unlimited.
    pub max_open_conns: u32,
    /// Maximum connection lifetime (ms). Zero means no limit.
    pub conn_max_lifetime_milliseconds: u64,
    /// Maximum connection idle time (ms). Zero means no limit.
    pub conn_max_idle_time_milliseconds: u64,
    /// Ping attempts made before giving up on a data source.
    pub connection_attempts: u32,
}

impl Default for SqlSettings {
    fn default() -> Self {
        Self {
            driver_name: DRIVER_POSTGRES.to_string(),
            data_source: String::new(),
            data_source_replicas: Vec::new(),
            data_source_search_replicas: Vec::new(),
            replica_lag_settings: Vec::new(),
            max_idle_conns: 20,
            max_open_conns: 300,
            conn_max_lifetime_milliseconds: 3_600_000,
            conn_max_idle_time_milliseconds: 300_000,
            connection_attempts: 5,
        }
    }
}

impl SqlSettings {
    pub fn conn_max_lifetime(&self) -> Duration {
        Duration::from_millis(self.conn_max_lifetime_milliseconds)
    }

    pub fn conn_max_idle_time(&self) -> Duration {
        Duration::from_millis(self.conn_max_idle_time_milliseconds)
    }

    /// Whether `driver_name` is one of [`SUPPORTED_DRIVERS`].
    pub fn is_supported_driver(&self) -> bool {
        SUPPORTED_DRIVERS.contains(&self.driver_name.as_str())
    }
}

/// Replica lag probe settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaLagSettings {
    /// Data source of the probe connection.
    pub data_source: String,
}
