//! How a dependency pulls its value out of the triggering event.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::action::Event;
use crate::error::{json_kind, DataTreeError, Result};

pub type ExtractFn = Arc<dyn Fn(&Event) -> Value + Send + Sync>;

/// A dot-separated path into the event's JSON record, e.g. `payload.entities.users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotPath {
    raw: String,
    segments: Vec<String>,
}

impl DotPath {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw.split('.').map(str::to_string).collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Walk the path. Any missing segment yields `None`.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

#[derive(Clone)]
pub enum Extractor {
    Func(ExtractFn),
    Path(DotPath),
}

impl Extractor {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Event) -> Value + Send + Sync + 'static,
    {
        Extractor::Func(Arc::new(f))
    }

    pub fn path(raw: impl Into<String>) -> Self {
        Extractor::Path(DotPath::parse(raw))
    }

    /// Build from the dynamic `meta.deps` form, where only strings are valid.
    pub fn from_value(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(raw) => Ok(Extractor::path(raw.as_str())),
            other => Err(DataTreeError::InvalidExtractor {
                key: key.to_string(),
                found: json_kind(other),
            }),
        }
    }

    /// Compute the satisfaction payload. Absent values become `null`.
    pub fn extract(&self, event: &Event) -> Value {
        match self {
            Extractor::Func(f) => f(event),
            Extractor::Path(path) => path
                .resolve(&event.to_value())
                .cloned()
                .unwrap_or(Value::Null),
        }
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extractor::Func(_) => f.write_str("Func(..)"),
            Extractor::Path(path) => f.debug_tuple("Path").field(&path.as_str()).finish(),
        }
    }
}

impl From<&str> for Extractor {
    fn from(raw: &str) -> Self {
        Extractor::path(raw)
    }
}

impl From<String> for Extractor {
    fn from(raw: String) -> Self {
        Extractor::path(raw)
    }
}

impl From<DotPath> for Extractor {
    fn from(path: DotPath) -> Self {
        Extractor::Path(path)
    }
}
