//! Pool sizing and role classification.

use mooring_common_config::SqlSettings;
use std::time::Duration;

/// Role labels starting with this prefix are replica lag probes.
pub const REPLICA_LAG_PREFIX: &str = "replica-lag";

/// Whether `role` names a replica lag probe connection.
pub fn is_replica_lag(role: &str) -> bool {
    role.starts_with(REPLICA_LAG_PREFIX)
}

/// Sizing applied to a pool handle once it has answered a ping.
///
/// A zero `max_open_conns`, `conn_max_lifetime` or `conn_max_idle_time`
/// means "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    pub conn_max_lifetime: Duration,
    pub conn_max_idle_time: Duration,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_open_conns: 0,
            max_idle_conns: 2,
            conn_max_lifetime: Duration::ZERO,
            conn_max_idle_time: Duration::ZERO,
        }
    }
}

impl PoolLimits {
    /// Limits for a connection with the given role label.
    ///
    /// Replica lag probes hold a single dedicated connection; every other
    /// role takes its connection counts from `settings`. Lifetime and idle
    /// time always come from `settings`.
    pub fn for_role(role: &str, settings: &SqlSettings) -> Self {
        let (max_open_conns, max_idle_conns) = if is_replica_lag(role) {
            (1, 1)
        } else {
            (settings.max_open_conns, settings.max_idle_conns)
        };

        Self {
            max_open_conns,
            max_idle_conns,
            conn_max_lifetime: settings.conn_max_lifetime(),
            conn_max_idle_time: settings.conn_max_idle_time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SqlSettings {
        SqlSettings {
            max_idle_conns: 50,
            max_open_conns: 50,
            conn_max_lifetime_milliseconds: 90_000,
            conn_max_idle_time_milliseconds: 1_500,
            ..Default::default()
        }
    }

    #[test]
    fn test_replica_lag_classification() {
        assert!(is_replica_lag("replica-lag"));
        assert!(is_replica_lag("replica-lag-0"));
        assert!(is_replica_lag("replica-lag-primary"));
        assert!(!is_replica_lag("replica"));
        assert!(!is_replica_lag("replica-0"));
        assert!(!is_replica_lag("master"));
        assert!(!is_replica_lag("my-replica-lag"));
    }

    #[test]
    fn test_replica_lag_role_gets_single_connection() {
        let limits = PoolLimits::for_role("replica-lag-primary", &settings());
        assert_eq!(limits.max_open_conns, 1);
        assert_eq!(limits.max_idle_conns, 1);
    }

    #[test]
    fn test_other_roles_use_settings_verbatim() {
        let mut s = settings();
        s.max_open_conns = 300;
        s.max_idle_conns = 20;

        let limits = PoolLimits::for_role("primary", &s);
        assert_eq!(limits.max_open_conns, 300);
        assert_eq!(limits.max_idle_conns, 20);
    }

    #[test]
    fn test_durations_never_overridden_by_role() {
        for role in ["master", "replica-0", "replica-lag-0"] {
            let limits = PoolLimits::for_role(role, &settings());
            assert_eq!(limits.conn_max_lifetime, Duration::from_secs(90));
            assert_eq!(limits.conn_max_idle_time, Duration::from_millis(1_500));
        }
    }
}
