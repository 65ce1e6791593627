//! The dependency declarer.
//!
//! validate → one satisfaction per dependency (map order) → original event.
//! Everything happens on the caller's stack before `declare` returns.

use tracing::{debug, warn};

use crate::action::{Action, Event, Satisfaction};
use crate::config::DataTreeConfig;
use crate::deps::Deps;
use crate::dispatch::Dispatch;
use crate::error::{DataTreeError, Result};

/// Wraps a host dispatcher so events can push data to other state slices.
pub struct Declarer<D> {
    dispatcher: D,
    config: DataTreeConfig,
}

/// Wrap `dispatcher` with the default configuration.
pub fn setup_tree<D: Dispatch>(dispatcher: D) -> Declarer<D> {
    Declarer::new(dispatcher)
}

impl<D: Dispatch> Declarer<D> {
    pub fn new(dispatcher: D) -> Self {
        Self::with_config(dispatcher, DataTreeConfig::default())
    }

    pub fn with_config(dispatcher: D, config: DataTreeConfig) -> Self {
        Self { dispatcher, config }
    }

    pub fn config(&self) -> &DataTreeConfig {
        &self.config
    }

    pub fn inner(&self) -> &D {
        &self.dispatcher
    }

    /// Dispatch one satisfaction per entry of `deps`, then `event` itself.
    ///
    /// Returns `event` unchanged. The forwarded copy has its out-of-band deps
    /// consumed, so a downstream declarer does not expand them again.
    /// Validation failures happen before the first dispatch. A host failure
    /// stops the sequence where it occurred.
    pub fn declare(&self, event: Event, deps: &Deps) -> Result<Event> {
        self.validate(&event)?;

        let namespace = &self.config.namespace;
        for (key, extractor) in deps.iter() {
            let sat = Satisfaction::new(namespace, key, extractor.extract(&event));
            debug!(key, address = %sat.address(), "dispatching satisfaction");
            self.dispatcher.dispatch(Action::Satisfaction(sat))?;
        }

        debug!(
            event_type = %event.event_type,
            deps = deps.len(),
            "dispatching original event"
        );
        let mut forwarded = event.clone();
        forwarded.take_deps();
        self.dispatcher.dispatch(Action::Plain(forwarded))?;
        Ok(event)
    }

    fn validate(&self, event: &Event) -> Result<()> {
        if self.config.guard_reserved && self.config.namespace.owns(&event.event_type) {
            return Err(DataTreeError::ReservedAddress {
                address: event.event_type.clone(),
            });
        }
        Ok(())
    }

    /// Out-of-band deps win over `meta.deps`.
    fn deps_for(&self, event: &mut Event) -> Result<Option<Deps>> {
        if let Some(deps) = event.take_deps() {
            return Ok(Some(deps));
        }
        match event.meta_deps() {
            Some(raw) => Deps::from_value(raw).map(Some).map_err(|e| {
                warn!(event_type = %event.event_type, error = %e, "rejected dependency map");
                e
            }),
            None => Ok(None),
        }
    }
}

/// Middleware form: plain events carrying deps are expanded, everything else
/// is forwarded as-is.
impl<D: Dispatch> Dispatch for Declarer<D> {
    fn dispatch(&self, action: Action) -> anyhow::Result<()> {
        match action {
            Action::Plain(mut event) => match self.deps_for(&mut event)? {
                Some(deps) => {
                    self.declare(event, &deps)?;
                    Ok(())
                }
                None => self.dispatcher.dispatch(Action::Plain(event)),
            },
            sat @ Action::Satisfaction(_) => self.dispatcher.dispatch(sat),
        }
    }
}
