//! The dispatch loop.

use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use datatree::{Action, Dispatch, Reducer};
use tracing::trace;

/// Reduce → record, synchronously, one action at a time.
pub struct Store<S, R>
where
    R: Reducer<S>,
{
    reducer: R,
    state: Mutex<S>,
    history: Mutex<Vec<Action>>,
}

impl<S, R> Store<S, R>
where
    R: Reducer<S>,
{
    pub fn new(reducer: R, initial: S) -> Self {
        Self {
            reducer,
            state: Mutex::new(initial),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Current state.
    pub fn state(&self) -> Result<S>
    where
        S: Clone,
    {
        Ok(lock(&self.state, "state")?.clone())
    }

    /// Every action reduced so far, in order.
    pub fn actions(&self) -> Result<Vec<Action>> {
        Ok(lock(&self.history, "history")?.clone())
    }

    pub fn reducer(&self) -> &R {
        &self.reducer
    }
}

impl<S, R> Dispatch for Store<S, R>
where
    R: Reducer<S>,
{
    fn dispatch(&self, action: Action) -> Result<()> {
        {
            let mut state = lock(&self.state, "state")?;
            let next = self.reducer.reduce(&*state, &action);
            *state = next;
        }
        trace!(address = %action.address(), "reduced");
        lock(&self.history, "history")?.push(action);
        Ok(())
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| anyhow!("store {what} lock poisoned"))
}
