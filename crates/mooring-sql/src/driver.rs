//! Driver factory and pool handles.

use crate::limits::PoolLimits;
use async_trait::async_trait;
use mooring_common_config::{DRIVER_MYSQL, DRIVER_POSTGRES};
use sqlx::any::{AnyConnectOptions, AnyPoolOptions};
use sqlx::{AnyConnection, AnyPool, Connection};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// sqlx preallocates idle slots for every permitted connection, so
/// "unlimited" needs a finite stand-in.
const UNBOUNDED_MAX_CONNECTIONS: u32 = 1024;

/// A pool handle that connects lazily and can be sized after the fact.
#[async_trait]
pub trait PoolHandle: Send + Sync {
    /// Check that the database answers.
    async fn ping(&self) -> Result<(), sqlx::Error>;

    /// Apply pool sizing.
    fn set_limits(&mut self, limits: PoolLimits);

    /// Sizing currently applied.
    fn limits(&self) -> PoolLimits;
}

/// Turns a data source into an unconnected pool handle.
pub trait SqlDriver: Send + Sync {
    type Handle: PoolHandle;

    fn open(&self, driver_name: &str, data_source: &str) -> Result<Self::Handle, sqlx::Error>;
}

/// [`SqlDriver`] over sqlx's runtime-selected `Any` driver.
#[derive(Debug, Clone, Copy)]
pub struct AnyDriver {
    _priv: (),
}

impl AnyDriver {
    /// Registers the PostgreSQL and MySQL drivers with sqlx.
    pub fn new() -> Self {
        sqlx::any::install_default_drivers();
        Self { _priv: () }
    }
}

impl Default for AnyDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn url_schemes(driver_name: &str) -> Option<&'static [&'static str]> {
    match driver_name {
        DRIVER_POSTGRES => Some(&["postgres", "postgresql"]),
        DRIVER_MYSQL => Some(&["mysql", "mariadb"]),
        _ => None,
    }
}

impl SqlDriver for AnyDriver {
    type Handle = AnyPoolHandle;

    fn open(&self, driver_name: &str, data_source: &str) -> Result<AnyPoolHandle, sqlx::Error> {
        let schemes = url_schemes(driver_name).ok_or_else(|| {
            sqlx::Error::Configuration(format!("unknown driver {driver_name:?}").into())
        })?;

        let options = AnyConnectOptions::from_str(data_source)?;
        let scheme = options.database_url.scheme();
        if !schemes.contains(&scheme) {
            return Err(sqlx::Error::Configuration(
                format!("data source scheme {scheme:?} does not match driver {driver_name:?}")
                    .into(),
            ));
        }

        debug!(driver = driver_name, "Opened lazy SQL pool");
        Ok(AnyPoolHandle::new(options))
    }
}

/// Lazily connecting `sqlx` pool.
#[derive(Debug)]
pub struct AnyPoolHandle {
    options: AnyConnectOptions,
    limits: PoolLimits,
    pool: AnyPool,
}

impl AnyPoolHandle {
    fn new(options: AnyConnectOptions) -> Self {
        let limits = PoolLimits::default();
        let pool = pool_options(&limits).connect_lazy_with(options.clone());
        Self {
            options,
            limits,
            pool,
        }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn into_pool(self) -> AnyPool {
        self.pool
    }
}

#[async_trait]
impl PoolHandle for AnyPoolHandle {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        let mut conn = AnyConnection::connect_with(&self.options).await?;
        conn.ping().await?;
        conn.close().await
    }

    /// sqlx fixes pool options at construction, so the (still unconnected)
    /// pool is rebuilt. sqlx has no idle-count cap; `max_idle_conns` is
    /// recorded only.
    fn set_limits(&mut self, limits: PoolLimits) {
        debug!(
            max_open_conns = limits.max_open_conns,
            max_idle_conns = limits.max_idle_conns,
            conn_max_lifetime_ms = limits.conn_max_lifetime.as_millis() as u64,
            conn_max_idle_time_ms = limits.conn_max_idle_time.as_millis() as u64,
            "Applying SQL pool limits"
        );
        self.pool = pool_options(&limits).connect_lazy_with(self.options.clone());
        self.limits = limits;
    }

    fn limits(&self) -> PoolLimits {
        self.limits
    }
}

fn non_zero(d: Duration) -> Option<Duration> {
    (!d.is_zero()).then_some(d)
}

fn pool_options(limits: &PoolLimits) -> AnyPoolOptions {
    let max_connections = match limits.max_open_conns {
        0 => UNBOUNDED_MAX_CONNECTIONS,
        n => n,
    };

    AnyPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(0)
        .max_lifetime(non_zero(limits.conn_max_lifetime))
        .idle_timeout(non_zero(limits.conn_max_idle_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_schemes() {
        assert!(url_schemes("postgres").unwrap().contains(&"postgresql"));
        assert!(url_schemes("mysql").unwrap().contains(&"mysql"));
        assert!(url_schemes("sqlite").is_none());
    }

    #[test]
    fn test_non_zero() {
        assert_eq!(non_zero(Duration::ZERO), None);
        assert_eq!(
            non_zero(Duration::from_millis(5)),
            Some(Duration::from_millis(5))
        );
    }

    #[test]
    fn test_pool_options_map_zero_to_unbounded() {
        let options = pool_options(&PoolLimits::default());
        assert_eq!(options.get_max_connections(), UNBOUNDED_MAX_CONNECTIONS);
        assert_eq!(options.get_max_lifetime(), None);
        assert_eq!(options.get_idle_timeout(), None);

        let options = pool_options(&PoolLimits {
            max_open_conns: 1,
            max_idle_conns: 1,
            conn_max_lifetime: Duration::from_secs(60),
            conn_max_idle_time: Duration::from_secs(5),
        });
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_max_lifetime(), Some(Duration::from_secs(60)));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(5)));
    }
}
