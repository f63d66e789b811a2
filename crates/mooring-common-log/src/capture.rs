//! In-memory logger for asserting on emitted events.

use crate::logger::{Field, FieldValue, Logger};
use parking_lot::Mutex;
use std::sync::Arc;

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// A captured log event, with bound fields merged ahead of event fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub fields: Vec<Field>,
}

impl Record {
    /// Value of the first field named `key`.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }
}

/// [`Logger`] that keeps every event in memory.
///
/// Clones, and loggers derived through [`Logger::with`], share one record buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    records: Arc<Mutex<Vec<Record>>>,
    fields: Vec<Field>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured events.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Number of captured events at `level`.
    pub fn count(&self, level: Level) -> usize {
        self.records.lock().iter().filter(|r| r.level == level).count()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn push(&self, level: Level, msg: &str, fields: &[Field]) {
        let mut merged = self.fields.clone();
        merged.extend_from_slice(fields);
        self.records.lock().push(Record {
            level,
            message: msg.to_string(),
            fields: merged,
        });
    }
}

impl Logger for MemoryLogger {
    fn info(&self, msg: &str, fields: &[Field]) {
        self.push(Level::Info, msg, fields);
    }

    fn error(&self, msg: &str, fields: &[Field]) {
        self.push(Level::Error, msg, fields);
    }

    fn with(&self, fields: &[Field]) -> Box<dyn Logger> {
        let mut bound = self.fields.clone();
        bound.extend_from_slice(fields);
        Box::new(Self {
            records: Arc::clone(&self.records),
            fields: bound,
        })
    }
}
