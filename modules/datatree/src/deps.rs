//! Dependency maps: listener key → extractor, in declaration order.

use serde_json::Value;

use crate::error::{json_kind, DataTreeError, Result};
use crate::extractor::Extractor;

/// Insertion-ordered dependency map. Iteration order is emission order.
#[derive(Debug, Clone, Default)]
pub struct Deps {
    entries: Vec<(String, Extractor)>,
}

impl Deps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Deps::insert`].
    pub fn with(mut self, key: impl Into<String>, extractor: impl Into<Extractor>) -> Self {
        self.insert(key, extractor);
        self
    }

    /// Add a dependency. An existing key keeps its position and gets the new extractor.
    pub fn insert(&mut self, key: impl Into<String>, extractor: impl Into<Extractor>) {
        let key = key.into();
        let extractor = extractor.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = extractor,
            None => self.entries.push((key, extractor)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Extractor> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Extractor)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the dynamic form found under an action's `meta.deps`.
    ///
    /// Every entry is checked before anything is returned.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or(DataTreeError::InvalidDependencyMap {
            found: json_kind(value),
        })?;

        let mut deps = Deps::new();
        for (key, raw) in map {
            deps.insert(key.clone(), Extractor::from_value(key, raw)?);
        }
        Ok(deps)
    }
}

impl<K, E> FromIterator<(K, E)> for Deps
where
    K: Into<String>,
    E: Into<Extractor>,
{
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        let mut deps = Deps::new();
        for (key, extractor) in iter {
            deps.insert(key, extractor);
        }
        deps
    }
}
