//! SQL connection pool setup for Mooring.
//!
//! [`setup_connection`] opens a lazily connecting pool, pings it until the
//! database answers (bounded attempts, a timeout per ping and a fixed pause
//! between attempts) and then sizes the pool for its role. Replica lag
//! probes (roles starting with [`REPLICA_LAG_PREFIX`]) always get a single
//! connection.
//!
//! [`SqlConnections`] runs that routine for the primary and every replica
//! configured in [`SqlSettings`](mooring_common_config::SqlSettings).

pub mod connections;
pub mod driver;
pub mod error;
pub mod limits;
pub mod sanitize;
pub mod setup;

#[cfg(test)]
mod testing;

pub use connections::{Connection, ConnectionsError, SqlConnections};
pub use driver::{AnyDriver, AnyPoolHandle, PoolHandle, SqlDriver};
pub use error::{PingError, SetupError};
pub use limits::{is_replica_lag, PoolLimits, REPLICA_LAG_PREFIX};
pub use sanitize::{sanitize_data_source, SanitizeError, SANITIZED_PASSWORD};
pub use setup::{setup_connection, CONN_RETRY_SLEEP, PING_TIMEOUT};
