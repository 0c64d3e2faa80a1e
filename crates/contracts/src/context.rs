//! Structured log context: an open string-keyed map of typed values
//!
//! The engine never mutates a caller-supplied context; enrichment and
//! normalization always operate on clones.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Free-form structured fields attached to a log event
///
/// Keys are unique; insertion order is irrelevant (entries are kept sorted
/// so rendered output is deterministic).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogContext(BTreeMap<String, ContextValue>);

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any previous value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl FromIterator<(String, ContextValue)> for LogContext {
    fn from_iter<I: IntoIterator<Item = (String, ContextValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for LogContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A single context field value
///
/// A closed union instead of `any`: arbitrary structure is still expressible
/// through nesting, while every value stays renderable.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<ContextValue>),
    Map(LogContext),
    Error(LoggedError),
}

impl ContextValue {
    /// Borrow the inner string, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContextValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the inner error, if this is an error value
    pub fn as_error(&self) -> Option<&LoggedError> {
        match self {
            ContextValue::Error(e) => Some(e),
            _ => None,
        }
    }
}

// Rendering normalizes values the way the sinks expect: errors collapse to
// their short message, nested maps recurse.
impl Serialize for ContextValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContextValue::String(s) => serializer.serialize_str(s),
            ContextValue::Integer(i) => serializer.serialize_i64(*i),
            ContextValue::Float(f) => serializer.serialize_f64(*f),
            ContextValue::Bool(b) => serializer.serialize_bool(*b),
            ContextValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ContextValue::Map(map) => map.serialize(serializer),
            ContextValue::Error(e) => serializer.serialize_str(e.message()),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::String(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Integer(value)
    }
}

impl From<i32> for ContextValue {
    fn from(value: i32) -> Self {
        ContextValue::Integer(value.into())
    }
}

impl From<u32> for ContextValue {
    fn from(value: u32) -> Self {
        ContextValue::Integer(value.into())
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Float(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(values: Vec<T>) -> Self {
        ContextValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<LogContext> for ContextValue {
    fn from(value: LogContext) -> Self {
        ContextValue::Map(value)
    }
}

impl From<LoggedError> for ContextValue {
    fn from(value: LoggedError) -> Self {
        ContextValue::Error(value)
    }
}

/// Optional capability: an error type that can expose an expanded rendering
/// (typically a captured stack trace) distinct from its short message.
pub trait DetailedTrace {
    fn detailed_trace(&self) -> Option<String>;
}

/// An error captured into a log context
///
/// Carries the short message plus an optional expanded rendering. The
/// expansion is populated explicitly at construction; the engine never
/// inspects the original error type afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedError {
    message: String,
    detail: Option<String>,
}

impl LoggedError {
    /// Capture just the short message of any displayable error
    pub fn new(err: impl fmt::Display) -> Self {
        Self {
            message: err.to_string(),
            detail: None,
        }
    }

    /// Capture a short message together with an expanded rendering
    pub fn with_detail(err: impl fmt::Display, detail: impl Into<String>) -> Self {
        Self {
            message: err.to_string(),
            detail: Some(detail.into()),
        }
    }

    /// Capture an error that implements the [`DetailedTrace`] capability
    pub fn from_traced<E>(err: &E) -> Self
    where
        E: fmt::Display + DetailedTrace,
    {
        Self {
            message: err.to_string(),
            detail: err.detailed_trace(),
        }
    }

    /// Capture an `anyhow::Error`, using its Debug rendering (cause chain
    /// and, when enabled, backtrace) as the expansion if it adds anything
    /// beyond the short message.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = err.to_string();
        let expanded = format!("{err:?}");
        let detail = (expanded != message).then_some(expanded);
        Self { message, detail }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// The expanded rendering, if it is non-empty and actually richer than
    /// the short message
    pub fn expanded_trace(&self) -> Option<&str> {
        self.detail
            .as_deref()
            .filter(|d| !d.is_empty() && *d != self.message)
    }
}

impl fmt::Display for LoggedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
