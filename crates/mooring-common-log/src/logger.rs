//! Structured, contextual logger capability.
//!
//! Components that need to emit events with bound context take a
//! `&dyn Logger` instead of calling `tracing` directly, so tests can
//! swap in a [`MemoryLogger`](crate::MemoryLogger) and assert on what
//! was logged.

use std::fmt;

/// A value attached to a log field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Error(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) | FieldValue::Error(s) => write!(f, "{s:?}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// A key/value pair attached to a log event.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub fn string(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: FieldValue::String(value.into()),
        }
    }

    pub fn int(key: &'static str, value: i64) -> Self {
        Self {
            key,
            value: FieldValue::Int(value),
        }
    }

    pub fn float(key: &'static str, value: f64) -> Self {
        Self {
            key,
            value: FieldValue::Float(value),
        }
    }

    /// An `error` field holding the error's display text.
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self {
            key: "error",
            value: FieldValue::Error(err.to_string()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Structured logging capability.
pub trait Logger: Send + Sync {
    fn info(&self, msg: &str, fields: &[Field]);

    fn error(&self, msg: &str, fields: &[Field]);

    /// Returns a logger that attaches `fields` to every event it emits.
    fn with(&self, fields: &[Field]) -> Box<dyn Logger>;
}

/// [`Logger`] backed by the global `tracing` subscriber.
///
/// The connection setup keys (`database`, `dataSource`, `attempt`,
/// `retrying in seconds`, `error`) are recorded as native `tracing` fields,
/// so structured formatters see each of them on its own. Any other key, or
/// a known key carrying an unexpected kind of value, is rendered into a
/// single `extra` field.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    fields: Vec<Field>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Bound fields plus the fields of one event. Later fields win.
struct Event<'a> {
    bound: &'a [Field],
    fields: &'a [Field],
}

impl<'a> Event<'a> {
    fn is_native(field: &Field) -> bool {
        matches!(
            (field.key, &field.value),
            ("database" | "dataSource", FieldValue::String(_))
                | ("attempt", FieldValue::Int(_))
                | ("retrying in seconds", FieldValue::Float(_))
                | ("error", FieldValue::Error(_) | FieldValue::String(_))
        )
    }

    fn native(&self, key: &str) -> Option<&'a FieldValue> {
        self.fields
            .iter()
            .rev()
            .chain(self.bound.iter().rev())
            .find(|f| f.key == key && Self::is_native(f))
            .map(|f| &f.value)
    }

    fn str(&self, key: &str) -> Option<&'a str> {
        match self.native(key)? {
            FieldValue::String(s) | FieldValue::Error(s) => Some(s),
            _ => None,
        }
    }

    fn int(&self, key: &str) -> Option<i64> {
        match self.native(key)? {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn float(&self, key: &str) -> Option<f64> {
        match self.native(key)? {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn extra(&self) -> Option<String> {
        let rest: Vec<Field> = self
            .bound
            .iter()
            .chain(self.fields)
            .filter(|f| !Self::is_native(f))
            .cloned()
            .collect();
        (!rest.is_empty()).then(|| Joined(&rest, &[]).to_string())
    }
}

struct Joined<'a>(&'a [Field], &'a [Field]);

impl fmt::Display for Joined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().chain(self.1).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

macro_rules! emit {
    ($level:expr, $event:expr, $msg:expr) => {{
        let event = $event;
        let extra = event.extra();
        tracing::event!(
            $level,
            database = event.str("database"),
            dataSource = event.str("dataSource"),
            attempt = event.int("attempt"),
            "retrying in seconds" = event.float("retrying in seconds"),
            error = event.str("error"),
            extra = extra.as_deref(),
            "{}",
            $msg
        );
    }};
}

impl Logger for TracingLogger {
    fn info(&self, msg: &str, fields: &[Field]) {
        emit!(
            tracing::Level::INFO,
            Event {
                bound: &self.fields,
                fields
            },
            msg
        );
    }

    fn error(&self, msg: &str, fields: &[Field]) {
        emit!(
            tracing::Level::ERROR,
            Event {
                bound: &self.fields,
                fields
            },
            msg
        );
    }

    fn with(&self, fields: &[Field]) -> Box<dyn Logger> {
        let mut bound = self.fields.clone();
        bound.extend_from_slice(fields);
        Box::new(Self { fields: bound })
    }
}
