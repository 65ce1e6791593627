use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataTreeError {
    #[error("The dependency key must be a non-empty string")]
    InvalidKey,

    #[error("Dependent reducer values must be either a function or a string, but got {found} for {key}")]
    InvalidExtractor { key: String, found: &'static str },

    #[error("Dependency map must be an object, but got {found}")]
    InvalidDependencyMap { found: &'static str },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Event type {address} lies in the reserved namespace")]
    ReservedAddress { address: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Dispatch(#[from] anyhow::Error),
}

impl DataTreeError {
    /// Invalid keys, extractors, dependency maps, namespaces and config.
    /// Wire-parsing and host failures are not configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DataTreeError::InvalidKey
                | DataTreeError::InvalidExtractor { .. }
                | DataTreeError::InvalidDependencyMap { .. }
                | DataTreeError::InvalidNamespace(_)
                | DataTreeError::ReservedAddress { .. }
                | DataTreeError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DataTreeError>;

/// Kind name of a JSON value, used in validation messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
