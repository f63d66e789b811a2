//! Connection establishment with bounded ping retries.

use crate::driver::{PoolHandle, SqlDriver};
use crate::error::{PingError, SetupError};
use crate::limits::PoolLimits;
use crate::sanitize::sanitize_data_source;
use mooring_common_config::SqlSettings;
use mooring_common_log::{Field, Logger};
use std::time::Duration;

/// Upper bound on a single ping.
pub const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between a failed ping and the next attempt.
pub const CONN_RETRY_SLEEP: Duration = Duration::from_secs(2);

/// Open a pool for `data_source`, wait until it answers a ping, then size it
/// for `role`.
///
/// The database gets up to `attempts` pings (at least one), each bounded by
/// [`PING_TIMEOUT`] and separated by [`CONN_RETRY_SLEEP`]. The sleep is not
/// cut short by anything but dropping the returned future.
///
/// # Errors
///
/// * [`SetupError::Open`] if the driver rejects the data source. Nothing is
///   pinged or logged in that case.
/// * [`SetupError::Ping`] carrying the last ping error once every attempt
///   has failed.
pub async fn setup_connection<D: SqlDriver>(
    driver: &D,
    logger: &dyn Logger,
    role: &str,
    data_source: &str,
    settings: &SqlSettings,
    attempts: u32,
) -> Result<D::Handle, SetupError> {
    let mut handle = driver
        .open(&settings.driver_name, data_source)
        .map_err(SetupError::Open)?;

    // The driver accepted the data source, so a sanitizer failure only costs us the log field.
    let sanitized = sanitize_data_source(&settings.driver_name, data_source).unwrap_or_default();

    let logger = logger.with(&[
        Field::string("database", role),
        Field::string("dataSource", sanitized),
    ]);

    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        if attempt > 1 {
            logger.info("Pinging SQL", &[Field::int("attempt", attempt.into())]);
        }

        match ping(&handle).await {
            Ok(()) => break,
            Err(err) if attempt == attempts => return Err(err.into()),
            Err(err) => {
                logger.error(
                    "Failed to ping DB",
                    &[
                        Field::float("retrying in seconds", CONN_RETRY_SLEEP.as_secs_f64()),
                        Field::error(&err),
                    ],
                );
                tokio::time::sleep(CONN_RETRY_SLEEP).await;
            }
        }
    }

    handle.set_limits(PoolLimits::for_role(role, settings));
    Ok(handle)
}

async fn ping<H: PoolHandle>(handle: &H) -> Result<(), PingError> {
    match tokio::time::timeout(PING_TIMEOUT, handle.ping()).await {
        Ok(result) => result.map_err(PingError::Driver),
        Err(_) => Err(PingError::TimedOut(PING_TIMEOUT)),
    }
}
