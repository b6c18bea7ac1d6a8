//! Signals: named, uniquely identified nets.

use crate::component::ComponentId;
use crate::error::{SimError, SimResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, stable identifier for a [`Signal`] within the owning simulator.
///
/// Assigned from the simulator's single monotonic id counter (shared with
/// [`ComponentId`]) and never reused for the simulator's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignalId(pub u64);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sig{}", self.0)
    }
}

/// A named net: a current tri-valued state plus the ordered list of
/// components that observe it.
///
/// `current_value` is changed only by [`crate::simulator::Simulator::step`];
/// nothing else in the kernel writes it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    id: SignalId,
    name: String,
    current_value: Value,
    observers: Vec<ComponentId>,
}

impl Signal {
    pub(crate) fn new(id: SignalId, name: String, initial_value: Value) -> SimResult<Self> {
        if name.is_empty() {
            return Err(SimError::InvalidArgument(
                "signal name must not be empty".to_string(),
            ));
        }
        Ok(Signal {
            id,
            name,
            current_value: initial_value,
            observers: Vec::new(),
        })
    }

    /// This signal's stable identifier.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// This signal's name, unique within its owning simulator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current value.
    pub fn value(&self) -> Value {
        self.current_value
    }

    /// The components currently observing this signal, in attachment order.
    pub fn observers(&self) -> &[ComponentId] {
        &self.observers
    }

    /// Append `component` to this signal's observer list.
    ///
    /// Connecting the same component to the same signal twice registers it
    /// twice; the kernel does not guard against this (see spec §9) —
    /// callers must not do it.
    pub(crate) fn attach_observer(&mut self, component: ComponentId) {
        self.observers.push(component);
    }

    /// Write a new value. Only ever called from `Simulator::step`.
    pub(crate) fn set_value(&mut self, value: Value) {
        self.current_value = value;
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.current_value)
    }
}
