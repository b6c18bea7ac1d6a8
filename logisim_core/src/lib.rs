//! Discrete-event digital logic simulation kernel.
//!
//! A netlist of tri-valued (`0`/`1`/`X`) signals and components — AND, OR,
//! NOT, XOR gates and an edge-triggered D flip-flop — advanced through a
//! causally ordered event queue. The one rule the rest of the crate exists
//! to uphold: at any given timestamp, every signal write completes before
//! any component observes it (see [`simulator::Simulator::step`]).
//!
//! ```
//! use logisim_core::{Component, GateKind, Simulator, Event, Timestamp, Value};
//!
//! let mut sim = Simulator::new();
//! let a = sim.create_signal("A", Value::Zero).unwrap();
//! let y = sim.create_signal("Y", Value::Unknown).unwrap();
//! let inverter = sim.add_component(Component::gate(GateKind::Not, None));
//! sim.connect_input(inverter, a).unwrap();
//! sim.connect_output(inverter, y).unwrap();
//!
//! sim.schedule_event(Event::new(Timestamp(0), a, Value::One)).unwrap();
//! sim.run_all().unwrap();
//! assert_eq!(sim.signal(y).unwrap().value(), Value::Zero);
//! ```

pub mod component;
pub mod error;
pub mod event;
pub mod signal;
pub mod simulator;
pub mod trace;
pub mod value;
mod vcd;

pub use component::{Component, ComponentId, Dff, Edge, Gate, GateKind};
pub use error::{SimError, SimResult};
pub use event::{Event, EventQueue, Timestamp};
pub use signal::{Signal, SignalId};
pub use simulator::{Simulator, SimulatorConfig};
pub use trace::{TraceLog, TraceRecord};
pub use value::Value;
