//! Scripted driver and handle doubles.

use crate::driver::{PoolHandle, SqlDriver};
use crate::limits::PoolLimits;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Outcome of one scripted ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ping {
    Ok,
    Fail,
    Hang,
}

/// Opens [`FakeHandle`]s that answer pings from a script.
///
/// Data sources listed in `fail_open_for` are rejected at open; data
/// sources with an entry in `scripts` get that script, others answer
/// every ping. `open_calls` counts every call to `open`, `opened` only
/// the successful ones.
#[derive(Default)]
pub(crate) struct FakeDriver {
    pub fail_open_for: Vec<String>,
    pub scripts: Vec<(String, Vec<Ping>)>,
    pub default_script: Vec<Ping>,
    pub open_calls: AtomicUsize,
    pub opened: AtomicUsize,
}

impl FakeDriver {
    pub fn pinging(script: &[Ping]) -> Self {
        Self {
            default_script: script.to_vec(),
            ..Default::default()
        }
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open_for: vec![String::new()],
            ..Default::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn open_calls(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }
}

impl SqlDriver for FakeDriver {
    type Handle = FakeHandle;

    fn open(&self, _driver_name: &str, data_source: &str) -> Result<FakeHandle, sqlx::Error> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .fail_open_for
            .iter()
            .any(|ds| ds.is_empty() || ds == data_source)
        {
            return Err(sqlx::Error::Configuration("invalid data source".into()));
        }

        let id = self.opened.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .iter()
            .find(|(ds, _)| ds == data_source)
            .map(|(_, s)| s.clone())
            .unwrap_or_else(|| self.default_script.clone());

        Ok(FakeHandle {
            id,
            data_source: data_source.to_string(),
            script: Mutex::new(script.into()),
            pings: AtomicUsize::new(0),
            limits: PoolLimits::default(),
            limit_writes: 0,
        })
    }
}

#[derive(Debug)]
pub(crate) struct FakeHandle {
    pub id: usize,
    pub data_source: String,
    script: Mutex<VecDeque<Ping>>,
    pings: AtomicUsize,
    limits: PoolLimits,
    pub limit_writes: usize,
}

impl FakeHandle {
    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolHandle for FakeHandle {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front().unwrap_or(Ping::Ok);
        match next {
            Ping::Ok => Ok(()),
            Ping::Fail => Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            Ping::Hang => std::future::pending().await,
        }
    }

    fn set_limits(&mut self, limits: PoolLimits) {
        self.limits = limits;
        self.limit_writes += 1;
    }

    fn limits(&self) -> PoolLimits {
        self.limits
    }
}
