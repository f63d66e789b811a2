//! Connection setup errors.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single liveness check.
#[derive(Debug, Error)]
pub enum PingError {
    #[error(transparent)]
    Driver(#[from] sqlx::Error),

    #[error("ping timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Failure to establish a connection pool.
///
/// Open failures carry a fixed prefix; an exhausted ping budget surfaces the
/// last ping error as-is.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to open SQL connection: {0}")]
    Open(#[source] sqlx::Error),

    #[error(transparent)]
    Ping(#[from] PingError),
}
