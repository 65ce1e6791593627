//! Minimal synchronous store.
//!
//! Owns one state value and a root reducer. Every dispatched action is
//! reduced and recorded before `dispatch` returns, which is all the
//! declarer needs from a host.

pub mod store;

pub use store::Store;
