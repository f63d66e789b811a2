//! `mooring check`: establish every configured pool and report it.

use std::io::{self, Write};

use anyhow::Context;
use clap::Args;
use mooring_common_config::MooringConfig;
use mooring_common_log::TracingLogger;
use mooring_sql::{AnyDriver, Connection, PoolHandle, PoolLimits, SqlConnections};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Check SQL connectivity
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Ping attempts per connection (overrides `sql.connection_attempts`)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub attempts: Option<u32>,
}

/// One established connection as printed by `mooring check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub role: String,
    pub data_source: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    pub conn_max_lifetime_ms: u64,
    pub conn_max_idle_time_ms: u64,
}

impl ConnectionReport {
    fn new(role: &str, data_source: &str, limits: PoolLimits) -> Self {
        Self {
            role: role.to_string(),
            data_source: data_source.to_string(),
            max_open_conns: limits.max_open_conns,
            max_idle_conns: limits.max_idle_conns,
            conn_max_lifetime_ms: limits.conn_max_lifetime.as_millis() as u64,
            conn_max_idle_time_ms: limits.conn_max_idle_time.as_millis() as u64,
        }
    }

    fn from_connection<H: PoolHandle>(conn: &Connection<H>) -> Self {
        Self::new(&conn.role, &conn.data_source, conn.handle.limits())
    }

    fn to_text(&self) -> String {
        format!(
            "{:<18} {}  open={} idle={} lifetime={}ms idle_time={}ms",
            self.role,
            self.data_source,
            self.max_open_conns,
            self.max_idle_conns,
            self.conn_max_lifetime_ms,
            self.conn_max_idle_time_ms,
        )
    }
}

impl CheckCommand {
    pub async fn execute(
        self,
        config: MooringConfig,
        format: OutputFormat,
        quiet: bool,
    ) -> Result<(), CliError> {
        let mut settings = config.sql;
        if let Some(attempts) = self.attempts {
            settings.connection_attempts = attempts;
        }

        let driver = AnyDriver::new();
        let logger = TracingLogger::new();

        let connections = SqlConnections::setup(&driver, &logger, &settings).await?;
        tracing::info!(count = connections.count(), "SQL connections established");

        let reports: Vec<_> = connections
            .iter()
            .map(ConnectionReport::from_connection)
            .collect();

        write_reports(&mut io::stdout().lock(), &reports, format, quiet)?;

        for conn in connections.iter() {
            conn.handle.pool().close().await;
        }

        Ok(())
    }
}

fn write_reports(
    out: &mut impl Write,
    reports: &[ConnectionReport],
    format: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    if quiet {
        return Ok(());
    }

    match format {
        OutputFormat::Text => {
            for report in reports {
                writeln!(out, "{}", report.to_text()).context("failed to write report")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, reports)
                .context("failed to serialize report")?;
            writeln!(out).context("failed to write report")?;
        }
    }
    Ok(())
}
