//! The simulator kernel: registries, scheduling, and the batched `step`
//! that is the heart of this crate (spec.md §4.H).

use crate::component::{Component, ComponentId};
use crate::error::{SimError, SimResult};
use crate::event::{Event, EventQueue, Timestamp};
use crate::signal::{Signal, SignalId};
use crate::trace::TraceLog;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;

/// Opt-in guard against runaway simulations.
///
/// The kernel is otherwise unconditional — a zero-delay combinational
/// feedback loop spins `step` forever, which spec.md §9 calls out as
/// undefined, not a crash. Disabled (all `None`) by default, matching
/// `Simulator::new()`; set via [`Simulator::with_config`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatorConfig {
    /// Abort with [`SimError::Budget`] once this many events have been
    /// drained from the queue.
    pub max_events: Option<u64>,
    /// Abort with [`SimError::Budget`] if `step` would advance `now` past
    /// this simulated time.
    pub max_time: Option<Timestamp>,
}

/// The simulation kernel.
///
/// Owns every signal and component it creates; nothing outside holds
/// mutable access to them. Signals and components are addressed by id
/// through [`IndexMap`]s that preserve creation order — load-bearing for
/// VCD `$var` declaration order and for "evaluate observers in insertion
/// order" (§4.H step 4).
#[derive(Debug)]
pub struct Simulator {
    signals: IndexMap<SignalId, Signal>,
    components: IndexMap<ComponentId, Component>,
    name_index: HashMap<String, SignalId>,
    initial_values: IndexMap<SignalId, Value>,
    queue: EventQueue,
    now: Timestamp,
    next_id: u64,
    trace: TraceLog,
    trace_enabled: bool,
    console_trace: bool,
    config: SimulatorConfig,
    events_processed: u64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// A fresh, empty simulator with no configured budget.
    pub fn new() -> Self {
        Simulator {
            signals: IndexMap::new(),
            components: IndexMap::new(),
            name_index: HashMap::new(),
            initial_values: IndexMap::new(),
            queue: EventQueue::new(),
            now: Timestamp(0),
            next_id: 0,
            trace: TraceLog::new(),
            trace_enabled: false,
            console_trace: false,
            config: SimulatorConfig::default(),
            events_processed: 0,
        }
    }

    /// A simulator bounded by `config` (spec.md §6.3, supplemental).
    pub fn with_config(config: SimulatorConfig) -> Self {
        Simulator {
            config,
            ..Self::new()
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Construct a signal, enforcing name uniqueness and recording the
    /// initial-value snapshot used by `dump_waveform`.
    pub fn create_signal(
        &mut self,
        name: impl Into<String>,
        initial_value: Value,
    ) -> SimResult<SignalId> {
        let name = name.into();
        if self.name_index.contains_key(&name) {
            return Err(SimError::DuplicateName(name));
        }
        let id = SignalId(self.next_id());
        let signal = Signal::new(id, name.clone(), initial_value)?;
        self.name_index.insert(name, id);
        self.initial_values.insert(id, initial_value);
        self.signals.insert(id, signal);
        log::trace!("created signal {id} = {initial_value}");
        Ok(id)
    }

    /// Register a component, returning its assigned id.
    pub fn add_component(&mut self, component: Component) -> ComponentId {
        let id = ComponentId(self.next_id());
        self.components.insert(id, component);
        log::trace!("registered component {id}");
        id
    }

    pub fn signal(&self, id: SignalId) -> Option<&Signal> {
        self.signals.get(&id)
    }

    pub fn signal_by_name(&self, name: &str) -> Option<&Signal> {
        self.name_index.get(name).and_then(|id| self.signals.get(id))
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    fn attach_observer(&mut self, signal: SignalId, component: ComponentId) -> SimResult<()> {
        self.signals
            .get_mut(&signal)
            .ok_or_else(|| SimError::InvalidArgument(format!("unknown signal {signal}")))?
            .attach_observer(component);
        Ok(())
    }

    fn component_mut(&mut self, id: ComponentId) -> SimResult<&mut Component> {
        self.components
            .get_mut(&id)
            .ok_or_else(|| SimError::InvalidArgument(format!("unknown component {id}")))
    }

    fn require_signal(&self, id: SignalId) -> SimResult<()> {
        if self.signals.contains_key(&id) {
            Ok(())
        } else {
            Err(SimError::InvalidArgument(format!("unknown signal {id}")))
        }
    }

    /// Connect `signal` as a gate input (meaningless for a DFF — use
    /// `connect_data`/`connect_clock`/`connect_reset`/`connect_enable`).
    pub fn connect_input(&mut self, component: ComponentId, signal: SignalId) -> SimResult<()> {
        self.require_signal(signal)?;
        match self.component_mut(component)? {
            Component::Gate(gate) => gate.connect_input(signal),
            Component::Dff(_) => {
                return Err(SimError::InvalidArgument(
                    "DFF has no generic input; use connect_data".to_string(),
                ))
            }
        }
        self.attach_observer(signal, component)
    }

    /// Connect `signal` as a gate's output. Outputs are written, not
    /// observed, so no observer attachment happens here.
    pub fn connect_output(&mut self, component: ComponentId, signal: SignalId) -> SimResult<()> {
        self.require_signal(signal)?;
        match self.component_mut(component)? {
            Component::Gate(gate) => {
                gate.connect_output(signal);
                Ok(())
            }
            Component::Dff(_) => Err(SimError::InvalidArgument(
                "DFF has no generic output; use connect_q".to_string(),
            )),
        }
    }

    /// Connect a DFF's clock input. The DFF attaches itself as an observer
    /// of the clock signal (spec.md §4.F).
    pub fn connect_clock(&mut self, component: ComponentId, signal: SignalId) -> SimResult<()> {
        self.require_signal(signal)?;
        let initial = self
            .signals
            .get(&signal)
            .map(Signal::value)
            .unwrap_or(Value::Unknown);
        match self.component_mut(component)? {
            Component::Dff(dff) => {
                dff.connect_clock(signal);
                dff.sync_last_clock(initial);
            }
            Component::Gate(_) => {
                return Err(SimError::InvalidArgument(
                    "only a DFF has a clock input".to_string(),
                ))
            }
        }
        self.attach_observer(signal, component)
    }

    /// Connect a DFF's data input. `D` is sampled on a qualifying edge, not
    /// itself an observed trigger, so no observer attachment happens.
    pub fn connect_data(&mut self, component: ComponentId, signal: SignalId) -> SimResult<()> {
        self.require_signal(signal)?;
        match self.component_mut(component)? {
            Component::Dff(dff) => {
                dff.connect_data(signal);
                Ok(())
            }
            Component::Gate(_) => Err(SimError::InvalidArgument(
                "only a DFF has a data input".to_string(),
            )),
        }
    }

    /// Connect a DFF's `Q` output. Written, not observed.
    pub fn connect_q(&mut self, component: ComponentId, signal: SignalId) -> SimResult<()> {
        self.require_signal(signal)?;
        match self.component_mut(component)? {
            Component::Dff(dff) => {
                dff.connect_q(signal);
                Ok(())
            }
            Component::Gate(_) => Err(SimError::InvalidArgument(
                "only a DFF has a Q output".to_string(),
            )),
        }
    }

    /// Connect a DFF's asynchronous reset. The DFF attaches itself as an
    /// observer so reset assertion/deassertion re-evaluates it.
    pub fn connect_reset(&mut self, component: ComponentId, signal: SignalId) -> SimResult<()> {
        self.require_signal(signal)?;
        match self.component_mut(component)? {
            Component::Dff(dff) => dff.connect_reset(signal),
            Component::Gate(_) => {
                return Err(SimError::InvalidArgument(
                    "only a DFF has a reset input".to_string(),
                ))
            }
        }
        self.attach_observer(signal, component)
    }

    /// Connect a DFF's clock-enable. The DFF attaches itself as an
    /// observer.
    pub fn connect_enable(&mut self, component: ComponentId, signal: SignalId) -> SimResult<()> {
        self.require_signal(signal)?;
        match self.component_mut(component)? {
            Component::Dff(dff) => dff.connect_enable(signal),
            Component::Gate(_) => {
                return Err(SimError::InvalidArgument(
                    "only a DFF has an enable input".to_string(),
                ))
            }
        }
        self.attach_observer(signal, component)
    }

    /// Schedule `event`. Fails if it names a signal this simulator does
    /// not own.
    pub fn schedule_event(&mut self, event: Event) -> SimResult<()> {
        self.require_signal(event.signal_id)
            .map_err(|_| SimError::UnknownSignal {
                event,
                signal_id: event.signal_id,
            })?;
        self.queue.schedule(event);
        Ok(())
    }

    /// Current simulated time.
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Clears the trace log and starts recording.
    pub fn enable_trace(&mut self) {
        self.trace.clear();
        self.trace_enabled = true;
    }

    /// Stops recording; preserves whatever was already logged.
    pub fn disable_trace(&mut self) {
        self.trace_enabled = false;
    }

    pub fn trace_log(&self) -> &TraceLog {
        &self.trace
    }

    /// When set alongside `enable_trace`, `step` additionally emits a
    /// human-readable `t=<time>ps: <name> <old> -> <new>` line through
    /// `log::info!` for every recorded change (spec.md §6.1).
    pub fn enable_console_trace(&mut self) {
        self.console_trace = true;
    }

    pub fn disable_console_trace(&mut self) {
        self.console_trace = false;
    }

    /// Advance simulated time by one timestamp batch.
    ///
    /// Drains every event sharing the next timestamp, applying all of
    /// their signal writes, before evaluating any observer — the
    /// correctness property the rest of the kernel exists to uphold
    /// (spec.md §4.H).
    pub fn step(&mut self) -> SimResult<()> {
        let t_star = match self.queue.peek_time_opt() {
            Some(t) => t,
            None => return Ok(()),
        };
        if let Some(max_time) = self.config.max_time {
            if t_star > max_time {
                return Err(SimError::Budget(format!(
                    "simulated time {t_star} exceeds configured maximum {max_time}"
                )));
            }
        }
        self.now = t_star;

        let mut collected_observers = Vec::new();
        while self.queue.peek_time_opt() == Some(t_star) {
            let event = self.queue.pop_next()?;
            self.events_processed += 1;
            if let Some(max_events) = self.config.max_events {
                if self.events_processed > max_events {
                    return Err(SimError::Budget(format!(
                        "event count exceeded configured maximum {max_events}"
                    )));
                }
            }

            let signal =
                self.signals
                    .get_mut(&event.signal_id)
                    .ok_or(SimError::UnknownSignal {
                        event,
                        signal_id: event.signal_id,
                    })?;
            let old = signal.value();
            signal.set_value(event.new_value);

            if self.trace_enabled && old != event.new_value {
                self.trace
                    .push(t_star, signal.name().to_string(), old, event.new_value);
                if self.console_trace {
                    log::info!(
                        "t={}ps: {} {} -> {}",
                        t_star,
                        signal.name(),
                        old,
                        event.new_value
                    );
                }
            }

            collected_observers.extend(signal.observers().iter().copied());
        }

        let signals = &self.signals;
        let read = |id: SignalId| signals.get(&id).map(Signal::value).unwrap_or(Value::Unknown);
        let mut scheduled = Vec::new();
        for component_id in collected_observers {
            if let Some(component) = self.components.get_mut(&component_id) {
                scheduled.extend(component.evaluate(&read, t_star));
            }
        }

        for event in scheduled {
            self.queue.schedule(event);
        }
        Ok(())
    }

    /// Step while the queue is non-empty and its next timestamp is
    /// `<= deadline`.
    pub fn run_until(&mut self, deadline: Timestamp) -> SimResult<()> {
        while let Some(t) = self.queue.peek_time_opt() {
            if t > deadline {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    /// Step until the queue drains.
    pub fn run_all(&mut self) -> SimResult<()> {
        while !self.queue.empty() {
            self.step()?;
        }
        Ok(())
    }

    /// Write the accumulated trace as a literal VCD file (spec.md §6).
    pub fn dump_waveform(&self, path: impl AsRef<Path>) -> SimResult<()> {
        crate::vcd::dump(
            &self.signals,
            &self.initial_values,
            &self.name_index,
            &self.trace,
            path.as_ref(),
        )
    }
}
