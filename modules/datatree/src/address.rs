//! Routing addresses and the reserved namespace satisfaction actions live in.
//!
//! Addresses compare by their namespace-qualified name. How an address was
//! built (parsed from a raw `type` string or minted from a listener key) never
//! affects equality.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{DataTreeError, Result};

pub const DEFAULT_NAMESPACE: &str = "dataTree";

/// The reserved prefix under which satisfaction addresses are minted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DataTreeError::InvalidNamespace(
                "namespace must not be empty".into(),
            ));
        }
        if name.ends_with('.') {
            return Err(DataTreeError::InvalidNamespace(format!(
                "namespace {name:?} must not end with '.'"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a raw event type falls under this namespace.
    pub fn owns(&self, name: &str) -> bool {
        self.key_of(name).is_some()
    }

    /// Strip `"<namespace>."` from a qualified name.
    pub fn key_of<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.0.as_str())?.strip_prefix('.')
    }

    /// Mint the reserved address for a listener key.
    pub fn address(&self, key: impl Into<String>) -> Address {
        Address::Reserved {
            namespace: self.clone(),
            key: key.into(),
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self(DEFAULT_NAMESPACE.to_string())
    }
}

impl TryFrom<String> for Namespace {
    type Error = DataTreeError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The `type` of an action.
#[derive(Debug, Clone)]
pub enum Address {
    /// A raw name, as carried by ordinary events.
    Plain(String),
    /// A name minted from a namespace and a listener key.
    Reserved { namespace: Namespace, key: String },
}

impl Address {
    pub fn plain(name: impl Into<String>) -> Self {
        Address::Plain(name.into())
    }

    /// The namespace-qualified name. Equality is defined on this.
    pub fn qualified(&self) -> String {
        match self {
            Address::Plain(name) => name.clone(),
            Address::Reserved { namespace, key } => format!("{namespace}.{key}"),
        }
    }

    /// Listener key, if this address was minted under a namespace.
    pub fn key(&self) -> Option<&str> {
        match self {
            Address::Plain(_) => None,
            Address::Reserved { key, .. } => Some(key),
        }
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Address::Plain(a), Address::Plain(b)) => a == b,
            _ => self.qualified() == other.qualified(),
        }
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualified().hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Plain(name) => f.write_str(name),
            Address::Reserved { namespace, key } => write!(f, "{namespace}.{key}"),
        }
    }
}
