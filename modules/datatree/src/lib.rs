//! Dependency propagation between reducer state slices.
//!
//! An event declares which listener keys depend on it and how to extract
//! their data. The declarer turns each entry into a satisfaction action,
//! dispatches those in declaration order, then the event itself. A reducer
//! wrapped with a listener absorbs satisfactions addressed to its key into
//! its `entities` region and delegates everything else.
//!
//! Neither slice knows the other's shape; they only share the key.

pub mod action;
pub mod address;
pub mod config;
pub mod declarer;
pub mod deps;
pub mod dispatch;
pub mod error;
pub mod extractor;
pub mod listener;

pub use action::{Action, Event, Satisfaction, DATA_TREE_MARKER};
pub use address::{Address, Namespace, DEFAULT_NAMESPACE};
pub use config::DataTreeConfig;
pub use declarer::{setup_tree, Declarer};
pub use deps::Deps;
pub use dispatch::{Dispatch, MemoryDispatcher};
pub use error::{DataTreeError, Result};
pub use extractor::{DotPath, Extractor};
pub use listener::{listen_for, Entities, Listener, Listening, Reducer};
