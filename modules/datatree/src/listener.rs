//! Reducer wrapping for satisfaction actions addressed to one key.

use serde_json::{Map, Value};
use tracing::trace;

use crate::action::Action;
use crate::address::{Address, Namespace};
use crate::error::{DataTreeError, Result};

/// Pure state updates. Returns the next state, never mutates the current one.
pub trait Reducer<S>: Send + Sync {
    fn reduce(&self, state: &S, action: &Action) -> S;
}

impl<S, F> Reducer<S> for F
where
    F: Fn(&S, &Action) -> S + Send + Sync,
{
    fn reduce(&self, state: &S, action: &Action) -> S {
        self(state, action)
    }
}

/// States that own an `entities` region a satisfaction can replace.
pub trait Entities: Sized {
    /// Same state, `entities` replaced wholesale, everything else untouched.
    fn with_entities(&self, entities: Value) -> Self;
}

impl Entities for Map<String, Value> {
    fn with_entities(&self, entities: Value) -> Self {
        let mut next = self.clone();
        next.insert("entities".to_string(), entities);
        next
    }
}

impl Entities for Value {
    fn with_entities(&self, entities: Value) -> Self {
        let base = match self {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        Value::Object(base.with_entities(entities))
    }
}

/// Listens for satisfactions addressed to one key.
#[derive(Debug, Clone, PartialEq)]
pub struct Listener {
    address: Address,
}

/// Listener for `key` under the default namespace.
pub fn listen_for(key: &str) -> Result<Listener> {
    Listener::with_namespace(key, &Namespace::default())
}

impl Listener {
    pub fn with_namespace(key: &str, namespace: &Namespace) -> Result<Self> {
        if key.is_empty() {
            return Err(DataTreeError::InvalidKey);
        }
        Ok(Self {
            address: namespace.address(key),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Satisfaction variant first, then address equality.
    pub fn matches(&self, action: &Action) -> bool {
        match action {
            Action::Satisfaction(sat) => *sat.address() == self.address,
            Action::Plain(_) => false,
        }
    }

    pub fn wrap<R>(self, reducer: R) -> Listening<R> {
        Listening {
            listener: self,
            inner: reducer,
        }
    }
}

/// A reducer that also absorbs its listener's satisfactions.
#[derive(Debug, Clone)]
pub struct Listening<R> {
    listener: Listener,
    inner: R,
}

impl<R> Listening<R> {
    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<S, R> Reducer<S> for Listening<R>
where
    S: Entities,
    R: Reducer<S>,
{
    fn reduce(&self, state: &S, action: &Action) -> S {
        match action {
            Action::Satisfaction(sat) if *sat.address() == self.listener.address => {
                trace!(address = %sat.address(), "merging entities");
                state.with_entities(sat.payload().clone())
            }
            _ => self.inner.reduce(state, action),
        }
    }
}
