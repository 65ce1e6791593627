//! The seam toward the host dispatcher, plus an in-memory recorder.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::action::Action;

/// A synchronous dispatch entry point.
///
/// Dispatching one action must run every interested consumer before
/// returning.
pub trait Dispatch {
    fn dispatch(&self, action: Action) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemoryDispatcher (tests: records, reduces nothing)
// ---------------------------------------------------------------------------

/// Records every dispatched action in order.
#[derive(Debug, Default)]
pub struct MemoryDispatcher {
    actions: Mutex<Vec<Action>>,
}

impl MemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything dispatched so far.
    pub fn actions(&self) -> Vec<Action> {
        match self.actions.lock() {
            Ok(actions) => actions.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        match self.actions.lock() {
            Ok(mut actions) => actions.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl Dispatch for MemoryDispatcher {
    fn dispatch(&self, action: Action) -> Result<()> {
        self.actions
            .lock()
            .map_err(|_| anyhow!("memory dispatcher lock poisoned"))?
            .push(action);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blankets: let callers keep a handle on the dispatcher for assertions
// ---------------------------------------------------------------------------

impl<D: Dispatch + ?Sized> Dispatch for &D {
    fn dispatch(&self, action: Action) -> Result<()> {
        (**self).dispatch(action)
    }
}

impl<D: Dispatch + ?Sized> Dispatch for Arc<D> {
    fn dispatch(&self, action: Action) -> Result<()> {
        (**self).dispatch(action)
    }
}

impl<D: Dispatch + ?Sized> Dispatch for Box<D> {
    fn dispatch(&self, action: Action) -> Result<()> {
        (**self).dispatch(action)
    }
}
