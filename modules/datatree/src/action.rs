//! Actions flowing through the dispatcher.
//!
//! Ordinary events and synthesized satisfaction actions are distinct variants;
//! the marker field only exists in their JSON projection.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::address::{Address, Namespace};
use crate::deps::Deps;
use crate::error::{json_kind, DataTreeError, Result};

/// Field set to `true` on the JSON projection of satisfaction actions.
pub const DATA_TREE_MARKER: &str = "dataTree.action";

/// An ordinary action: `type`, optional `payload`, any other top-level fields.
///
/// A typed dependency map can ride along out of band. It is never serialized
/// and does not take part in equality.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(skip)]
    deps: Option<Deps>,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: Value::Null,
            fields: Map::new(),
            deps: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Set a top-level field. `type` and `payload` go to their own slots.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        match name.as_str() {
            "type" => {
                self.event_type = match value {
                    Value::String(t) => t,
                    other => other.to_string(),
                }
            }
            "payload" => self.payload = value,
            _ => {
                self.fields.insert(name, value);
            }
        }
        self
    }

    pub fn with_deps(mut self, deps: Deps) -> Self {
        self.deps = Some(deps);
        self
    }

    pub fn deps(&self) -> Option<&Deps> {
        self.deps.as_ref()
    }

    pub fn take_deps(&mut self) -> Option<Deps> {
        self.deps.take()
    }

    /// The dynamic dependency map under `meta.deps`, if any.
    pub fn meta_deps(&self) -> Option<&Value> {
        self.fields.get("meta")?.get("deps")
    }

    pub fn address(&self) -> Address {
        Address::plain(self.event_type.clone())
    }

    /// JSON record that dot-paths resolve against.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(self.event_type.clone()));
        if !self.payload.is_null() {
            obj.insert("payload".into(), self.payload.clone());
        }
        for (name, value) in &self.fields {
            if name != "type" && name != "payload" {
                obj.insert(name.clone(), value.clone());
            }
        }
        Value::Object(obj)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.event_type == other.event_type
            && self.payload == other.payload
            && self.fields == other.fields
    }
}

/// "The data for listener key K is now available."
#[derive(Debug, Clone, PartialEq)]
pub struct Satisfaction {
    address: Address,
    payload: Value,
}

impl Satisfaction {
    pub fn new(namespace: &Namespace, key: impl Into<String>, payload: Value) -> Self {
        Self {
            address: namespace.address(key),
            payload,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn key(&self) -> Option<&str> {
        self.address.key()
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Plain(Event),
    Satisfaction(Satisfaction),
}

impl Action {
    pub fn is_satisfaction(&self) -> bool {
        matches!(self, Action::Satisfaction(_))
    }

    pub fn address(&self) -> Address {
        match self {
            Action::Plain(event) => event.address(),
            Action::Satisfaction(sat) => sat.address.clone(),
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Action::Plain(event) => Some(event),
            Action::Satisfaction(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Action::Plain(event) => event.to_value(),
            Action::Satisfaction(sat) => {
                let mut obj = Map::new();
                obj.insert(DATA_TREE_MARKER.into(), Value::Bool(true));
                obj.insert("type".into(), Value::String(sat.address.qualified()));
                obj.insert("payload".into(), sat.payload.clone());
                Value::Object(obj)
            }
        }
    }

    /// Parse a JSON action.
    ///
    /// Only records carrying the marker AND a `type` inside `namespace` become
    /// satisfactions. A marker on a foreign type leaves the record plain.
    pub fn from_value(value: Value, namespace: &Namespace) -> Result<Action> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(DataTreeError::InvalidAction(format!(
                    "expected an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let event_type = match obj.get("type") {
            Some(Value::String(t)) => t.clone(),
            _ => {
                return Err(DataTreeError::InvalidAction(
                    "missing string `type`".into(),
                ))
            }
        };

        let marked = obj.get(DATA_TREE_MARKER) == Some(&Value::Bool(true));
        if marked {
            if let Some(key) = namespace.key_of(&event_type) {
                let payload = obj.remove("payload").unwrap_or(Value::Null);
                return Ok(Action::Satisfaction(Satisfaction::new(
                    namespace, key, payload,
                )));
            }
        }

        let event: Event = serde_json::from_value(Value::Object(obj))
            .map_err(|e| DataTreeError::InvalidAction(e.to_string()))?;
        Ok(Action::Plain(event))
    }
}

impl From<Event> for Action {
    fn from(event: Event) -> Self {
        Action::Plain(event)
    }
}

impl From<Satisfaction> for Action {
    fn from(sat: Satisfaction) -> Self {
        Action::Satisfaction(sat)
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
