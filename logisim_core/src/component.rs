//! The component model: combinational gates and the edge-triggered D
//! flip-flop, behind one closed, tagged `Component` enum (§9 — not open
//! inheritance).
//!
//! A component never reaches back into the simulator to read or write
//! signals directly. `evaluate` takes a read-only view of the current
//! signal values and returns the writes it wants scheduled; the simulator
//! owns applying those to the event queue. This sidesteps a
//! double-mutable-borrow of the simulator's own component/signal arenas
//! that a `fn evaluate(&mut self, sim: &mut Simulator, ...)` signature would
//! otherwise force.

use crate::event::{Event, Timestamp};
use crate::signal::SignalId;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, stable identifier for a [`Component`], drawn from the same
/// per-simulator counter as [`SignalId`] (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "comp{}", self.0)
    }
}

/// Which clock transition a sequential element reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    /// `0 -> 1`.
    Rising,
    /// `1 -> 0`.
    Falling,
    /// Any defined transition (`last != current && current != X`).
    Both,
}

/// Which combinational function a [`Gate`] computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateKind {
    And,
    Or,
    Not,
    Xor,
}

impl GateKind {
    /// Default propagation delay in picoseconds (spec.md §4.D).
    pub fn default_delay(self) -> u64 {
        match self {
            GateKind::And => 100,
            GateKind::Or => 100,
            GateKind::Not => 50,
            GateKind::Xor => 50,
        }
    }

    /// Minimum number of connected inputs before this gate does anything.
    /// `AND`/`OR`/`XOR` need two; `NOT` needs only the first.
    fn min_inputs(self) -> usize {
        match self {
            GateKind::Not => 1,
            _ => 2,
        }
    }
}

/// A combinational gate: AND, OR, NOT, or XOR over tri-valued inputs.
#[derive(Debug, Clone)]
pub struct Gate {
    kind: GateKind,
    inputs: Vec<SignalId>,
    output: Option<SignalId>,
    delay: u64,
}

impl Gate {
    pub fn new(kind: GateKind, delay: Option<u64>) -> Self {
        Gate {
            kind,
            inputs: Vec::new(),
            output: None,
            delay: delay.unwrap_or_else(|| kind.default_delay()),
        }
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    pub fn inputs(&self) -> &[SignalId] {
        &self.inputs
    }

    pub fn output(&self) -> Option<SignalId> {
        self.output
    }

    pub(crate) fn connect_input(&mut self, signal: SignalId) {
        self.inputs.push(signal);
    }

    pub(crate) fn connect_output(&mut self, signal: SignalId) {
        self.output = Some(signal);
    }

    /// Evaluate truth-table output from `read`, returning the write to
    /// schedule if (and only if) it differs from the current output —
    /// glitch suppression (spec.md §4.D, invariant 5).
    fn evaluate(&self, read: &dyn Fn(SignalId) -> Value, now: Timestamp) -> Vec<Event> {
        let output = match self.output {
            Some(o) => o,
            None => return Vec::new(),
        };
        if self.inputs.len() < self.kind.min_inputs() {
            return Vec::new();
        }
        let result = match self.kind {
            GateKind::And => Value::and_all(self.inputs.iter().map(|&id| read(id))),
            GateKind::Or => Value::or_all(self.inputs.iter().map(|&id| read(id))),
            GateKind::Xor => Value::xor_all(self.inputs.iter().map(|&id| read(id))),
            GateKind::Not => read(self.inputs[0]).not(),
        };
        if result == read(output) {
            return Vec::new();
        }
        vec![Event::new(now.add_delay(self.delay), output, result)]
    }
}

/// An edge-triggered D flip-flop with optional asynchronous reset and
/// clock-enable (spec.md §4.E).
#[derive(Debug, Clone)]
pub struct Dff {
    data: Option<SignalId>,
    clock: Option<SignalId>,
    q: Option<SignalId>,
    reset: Option<SignalId>,
    enable: Option<SignalId>,
    edge: Edge,
    delay: u64,
    /// Last observed clock value, seeded from the clock signal's own
    /// current value at `connect_clock` time (see `Simulator::connect_clock`)
    /// rather than left at `X` — otherwise the first real transition out of
    /// an unobserved initial state (e.g. `clk` starting at `0`) is missed
    /// because `X -> 1` never reads as a rising edge.
    last_clock: Value,
}

impl Dff {
    pub fn new(edge: Edge, delay: Option<u64>) -> Self {
        Dff {
            data: None,
            clock: None,
            q: None,
            reset: None,
            enable: None,
            edge,
            delay: delay.unwrap_or(100),
            last_clock: Value::Unknown,
        }
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn data(&self) -> Option<SignalId> {
        self.data
    }
    pub fn clock(&self) -> Option<SignalId> {
        self.clock
    }
    pub fn q(&self) -> Option<SignalId> {
        self.q
    }
    pub fn reset(&self) -> Option<SignalId> {
        self.reset
    }
    pub fn enable(&self) -> Option<SignalId> {
        self.enable
    }

    pub(crate) fn connect_data(&mut self, signal: SignalId) {
        self.data = Some(signal);
    }
    pub(crate) fn connect_clock(&mut self, signal: SignalId) {
        self.clock = Some(signal);
    }
    pub(crate) fn connect_q(&mut self, signal: SignalId) {
        self.q = Some(signal);
    }
    pub(crate) fn connect_reset(&mut self, signal: SignalId) {
        self.reset = Some(signal);
    }
    pub(crate) fn connect_enable(&mut self, signal: SignalId) {
        self.enable = Some(signal);
    }

    /// Seed `last_clock` with the clock signal's value at wiring time, so
    /// the first real transition is compared against the signal's actual
    /// starting level instead of `X`.
    pub(crate) fn sync_last_clock(&mut self, value: Value) {
        self.last_clock = value;
    }

    fn edge_fired(&self, last: Value, current: Value) -> bool {
        match self.edge {
            Edge::Rising => last == Value::Zero && current == Value::One,
            Edge::Falling => last == Value::One && current == Value::Zero,
            Edge::Both => last != current && current != Value::Unknown,
        }
    }

    fn evaluate(&mut self, read: &dyn Fn(SignalId) -> Value, now: Timestamp) -> Vec<Event> {
        let (q, d) = match (self.q, self.data) {
            (Some(q), Some(d)) => (q, d),
            _ => return Vec::new(),
        };

        // The edge detector runs on every evaluation, reset or not, so that
        // `last_clock` never goes stale across a reset span — otherwise the
        // very evaluation that deasserts reset would compare a live clock
        // value against a clock value from before reset was asserted and
        // could synthesize a capture out of thin air, violating the rule
        // that deasserting reset is never itself a capture trigger.
        let current_clock = self.clock.map(read).unwrap_or(Value::Unknown);
        let edge_fired = self.edge_fired(self.last_clock, current_clock);
        self.last_clock = current_clock;

        if let Some(reset) = self.reset {
            if read(reset) == Value::One {
                let q_val = read(q);
                if q_val != Value::Zero {
                    return vec![Event::new(now.add_delay(self.delay), q, Value::Zero)];
                }
                return Vec::new();
            }
        }

        if !edge_fired {
            return Vec::new();
        }

        if let Some(enable) = self.enable {
            if read(enable) == Value::Zero {
                return Vec::new();
            }
        }

        let sampled = read(d);
        if sampled == read(q) {
            return Vec::new();
        }
        vec![Event::new(now.add_delay(self.delay), q, sampled)]
    }
}

/// A simulation element: one of the four combinational gates or the
/// sequential D flip-flop.
#[derive(Debug, Clone)]
pub enum Component {
    Gate(Gate),
    Dff(Dff),
}

impl Component {
    pub fn gate(kind: GateKind, delay: Option<u64>) -> Self {
        Component::Gate(Gate::new(kind, delay))
    }

    pub fn dff(edge: Edge, delay: Option<u64>) -> Self {
        Component::Dff(Dff::new(edge, delay))
    }

    /// Evaluate this component given a read-only view of signal values,
    /// returning the events it wants scheduled.
    pub(crate) fn evaluate(
        &mut self,
        read: &dyn Fn(SignalId) -> Value,
        now: Timestamp,
    ) -> Vec<Event> {
        match self {
            Component::Gate(gate) => gate.evaluate(read, now),
            Component::Dff(dff) => dff.evaluate(read, now),
        }
    }

    pub fn as_gate(&self) -> Option<&Gate> {
        match self {
            Component::Gate(g) => Some(g),
            Component::Dff(_) => None,
        }
    }

    pub fn as_dff(&self) -> Option<&Dff> {
        match self {
            Component::Dff(d) => Some(d),
            Component::Gate(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn reader(values: &HashMap<SignalId, Value>) -> impl Fn(SignalId) -> Value + '_ {
        move |id| *values.get(&id).unwrap_or(&Value::Unknown)
    }

    #[test]
    fn and_gate_is_noop_with_fewer_than_two_inputs() {
        let mut gate = Gate::new(GateKind::And, Some(100));
        gate.connect_input(SignalId(0));
        gate.connect_output(SignalId(1));
        let mut values = HashMap::new();
        values.insert(SignalId(0), Value::One);
        values.insert(SignalId(1), Value::Unknown);
        assert!(gate.evaluate(&reader(&values), Timestamp(0)).is_empty());
    }

    #[test]
    fn not_gate_glitch_suppression() {
        let mut gate = Gate::new(GateKind::Not, Some(50));
        gate.connect_input(SignalId(0));
        gate.connect_output(SignalId(1));
        let mut values = HashMap::new();
        values.insert(SignalId(0), Value::Zero);
        values.insert(SignalId(1), Value::One); // already NOT(0)
        assert!(gate.evaluate(&reader(&values), Timestamp(0)).is_empty());

        values.insert(SignalId(1), Value::Zero); // stale, should recompute
        let events = gate.evaluate(&reader(&values), Timestamp(10));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].new_value, Value::One);
        assert_eq!(events[0].time, Timestamp(60));
    }

    #[test]
    fn dff_noop_without_d_or_q() {
        let mut dff = Dff::new(Edge::Rising, Some(50));
        dff.connect_clock(SignalId(0));
        // D and Q left unconnected.
        let values = HashMap::new();
        assert!(dff.evaluate(&reader(&values), Timestamp(0)).is_empty());
    }

    #[test]
    fn dff_rising_edge_capture() {
        let mut dff = Dff::new(Edge::Rising, Some(50));
        dff.connect_clock(SignalId(0));
        dff.connect_data(SignalId(1));
        dff.connect_q(SignalId(2));

        let mut values = HashMap::new();
        values.insert(SignalId(0), Value::Zero);
        values.insert(SignalId(1), Value::One);
        values.insert(SignalId(2), Value::Unknown);
        // First call just observes clock=0, no edge yet.
        assert!(dff.evaluate(&reader(&values), Timestamp(0)).is_empty());

        values.insert(SignalId(0), Value::One);
        let events = dff.evaluate(&reader(&values), Timestamp(100));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].signal_id, SignalId(2));
        assert_eq!(events[0].new_value, Value::One);
        assert_eq!(events[0].time, Timestamp(150));
    }

    #[test]
    fn dff_async_reset_dominates_and_rearms() {
        let mut dff = Dff::new(Edge::Rising, Some(50));
        dff.connect_clock(SignalId(0));
        dff.connect_data(SignalId(1));
        dff.connect_q(SignalId(2));
        dff.connect_reset(SignalId(3));

        let mut values = HashMap::new();
        values.insert(SignalId(0), Value::One); // clock already high
        values.insert(SignalId(1), Value::One);
        values.insert(SignalId(2), Value::One); // Q currently 1
        values.insert(SignalId(3), Value::Zero);
        dff.evaluate(&reader(&values), Timestamp(0)); // sync last_clock to 1

        // Assert reset: Q should be forced to 0, clock ignored.
        values.insert(SignalId(3), Value::One);
        let events = dff.evaluate(&reader(&values), Timestamp(10));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].new_value, Value::Zero);
        values.insert(SignalId(2), Value::Zero);

        // Toggle clock while reset asserted: still no capture.
        values.insert(SignalId(0), Value::Zero);
        assert!(dff.evaluate(&reader(&values), Timestamp(20)).is_empty());
        values.insert(SignalId(0), Value::One);
        assert!(dff.evaluate(&reader(&values), Timestamp(30)).is_empty());

        // Deassert reset: this transition must not itself capture.
        values.insert(SignalId(3), Value::Zero);
        assert!(dff.evaluate(&reader(&values), Timestamp(40)).is_empty());

        // A genuine subsequent rising edge now captures D again.
        values.insert(SignalId(0), Value::Zero);
        dff.evaluate(&reader(&values), Timestamp(50));
        values.insert(SignalId(0), Value::One);
        values.insert(SignalId(1), Value::One);
        let events = dff.evaluate(&reader(&values), Timestamp(60));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].new_value, Value::One);
    }

    #[test]
    fn dff_enable_gates_capture_without_consuming_edge() {
        let mut dff = Dff::new(Edge::Rising, Some(50));
        dff.connect_clock(SignalId(0));
        dff.connect_data(SignalId(1));
        dff.connect_q(SignalId(2));
        dff.connect_enable(SignalId(4));

        let mut values = HashMap::new();
        values.insert(SignalId(0), Value::Zero);
        values.insert(SignalId(1), Value::Zero);
        values.insert(SignalId(2), Value::Zero);
        values.insert(SignalId(4), Value::Zero); // disabled
        dff.evaluate(&reader(&values), Timestamp(0));

        values.insert(SignalId(1), Value::One);
        values.insert(SignalId(0), Value::One); // rising edge while disabled
        assert!(dff.evaluate(&reader(&values), Timestamp(10)).is_empty());

        values.insert(SignalId(4), Value::One); // re-enable
        values.insert(SignalId(0), Value::Zero);
        dff.evaluate(&reader(&values), Timestamp(20));
        values.insert(SignalId(0), Value::One);
        let events = dff.evaluate(&reader(&values), Timestamp(30));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].new_value, Value::One);
    }
}
