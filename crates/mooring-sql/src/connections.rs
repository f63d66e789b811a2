//! Startup of every connection pool named in the SQL settings.

use crate::driver::SqlDriver;
use crate::error::SetupError;
use crate::limits::REPLICA_LAG_PREFIX;
use crate::sanitize::sanitize_data_source;
use crate::setup::setup_connection;
use mooring_common_config::SqlSettings;
use mooring_common_log::Logger;
use thiserror::Error;

pub const MASTER_ROLE: &str = "master";
pub const REPLICA_ROLE: &str = "replica";
pub const SEARCH_REPLICA_ROLE: &str = "search-replica";

#[derive(Debug, Error)]
pub enum ConnectionsError {
    #[error("no primary data source configured")]
    MissingDataSource,

    #[error("failed to set up {role} connection: {source}")]
    Setup {
        role: String,
        #[source]
        source: SetupError,
    },
}

/// An established pool and the role it was set up for.
#[derive(Debug)]
pub struct Connection<H> {
    pub role: String,
    /// Data source with credentials masked.
    pub data_source: String,
    pub handle: H,
}

/// The primary pool plus every replica, search replica and replica lag pool.
#[derive(Debug)]
pub struct SqlConnections<H> {
    pub master: Connection<H>,
    pub replicas: Vec<Connection<H>>,
    pub search_replicas: Vec<Connection<H>>,
    pub replica_lag: Vec<Connection<H>>,
}

impl<H> SqlConnections<H> {
    /// Establish all configured pools in order: primary, replicas, search
    /// replicas, replica lag probes. Stops at the first failure.
    pub async fn setup<D>(
        driver: &D,
        logger: &dyn Logger,
        settings: &SqlSettings,
    ) -> Result<Self, ConnectionsError>
    where
        D: SqlDriver<Handle = H>,
    {
        if settings.data_source.is_empty() {
            return Err(ConnectionsError::MissingDataSource);
        }

        let master = connect(
            driver,
            logger,
            settings,
            MASTER_ROLE.to_string(),
            &settings.data_source,
        )
        .await?;

        let mut replicas = Vec::with_capacity(settings.data_source_replicas.len());
        for (i, ds) in settings.data_source_replicas.iter().enumerate() {
            replicas
                .push(connect(driver, logger, settings, format!("{REPLICA_ROLE}-{i}"), ds).await?);
        }

        let mut search_replicas = Vec::with_capacity(settings.data_source_search_replicas.len());
        for (i, ds) in settings.data_source_search_replicas.iter().enumerate() {
            search_replicas.push(
                connect(driver, logger, settings, format!("{SEARCH_REPLICA_ROLE}-{i}"), ds).await?,
            );
        }

        let mut replica_lag = Vec::with_capacity(settings.replica_lag_settings.len());
        for (i, lag) in settings.replica_lag_settings.iter().enumerate() {
            replica_lag.push(
                connect(
                    driver,
                    logger,
                    settings,
                    format!("{REPLICA_LAG_PREFIX}-{i}"),
                    &lag.data_source,
                )
                .await?,
            );
        }

        Ok(Self {
            master,
            replicas,
            search_replicas,
            replica_lag,
        })
    }

    /// All connections in setup order.
    pub fn iter(&self) -> impl Iterator<Item = &Connection<H>> {
        std::iter::once(&self.master)
            .chain(&self.replicas)
            .chain(&self.search_replicas)
            .chain(&self.replica_lag)
    }

    /// Number of established pools, primary included.
    pub fn count(&self) -> usize {
        1 + self.replicas.len() + self.search_replicas.len() + self.replica_lag.len()
    }
}

async fn connect<D: SqlDriver>(
    driver: &D,
    logger: &dyn Logger,
    settings: &SqlSettings,
    role: String,
    data_source: &str,
) -> Result<Connection<D::Handle>, ConnectionsError> {
    match setup_connection(
        driver,
        logger,
        &role,
        data_source,
        settings,
        settings.connection_attempts,
    )
    .await
    {
        Ok(handle) => Ok(Connection {
            data_source: sanitize_data_source(&settings.driver_name, data_source)
                .unwrap_or_default(),
            role,
            handle,
        }),
        Err(source) => Err(ConnectionsError::Setup { role, source }),
    }
}
