use std::env::{self, VarError};

use serde::{Deserialize, Serialize};

use crate::address::Namespace;
use crate::error::{DataTreeError, Result};

/// Declarer and listener configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTreeConfig {
    /// Reserved prefix for satisfaction addresses.
    #[serde(default)]
    pub namespace: Namespace,

    /// Reject ordinary events whose type lies inside `namespace`.
    #[serde(default)]
    pub guard_reserved: bool,
}

impl DataTreeConfig {
    /// Load configuration from environment variables. All are optional.
    ///
    /// - `DATA_TREE_NAMESPACE` (default `dataTree`)
    /// - `DATA_TREE_GUARD_RESERVED` (`true`/`false`/`1`/`0`, default `false`)
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name))
    }

    /// Same as [`DataTreeConfig::from_env`], reading through `lookup`.
    ///
    /// Unset variables fall back to defaults. Set but malformed ones,
    /// non-unicode included, are errors.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let namespace = match optional_var(&lookup, "DATA_TREE_NAMESPACE")? {
            Some(raw) => Namespace::new(raw)?,
            None => Namespace::default(),
        };
        let guard_reserved = match optional_var(&lookup, "DATA_TREE_GUARD_RESERVED")? {
            Some(raw) => parse_flag("DATA_TREE_GUARD_RESERVED", &raw)?,
            None => false,
        };
        Ok(Self {
            namespace,
            guard_reserved,
        })
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_guard_reserved(mut self, guard: bool) -> Self {
        self.guard_reserved = guard;
        self
    }
}

fn optional_var<F>(lookup: &F, name: &str) -> Result<Option<String>>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    match lookup(name) {
        Ok(raw) => Ok(Some(raw)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(DataTreeError::Config(format!(
            "{name} is not valid unicode: {raw:?}"
        ))),
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(DataTreeError::Config(format!(
            "{name} must be true/false/1/0, got {other:?}"
        ))),
    }
}
