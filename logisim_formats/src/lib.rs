//! Thin companion crate for `logisim_core`'s waveform output.
//!
//! The VCD serializer itself lives on
//! [`logisim_core::Simulator::dump_waveform`] (it is part of the kernel's
//! own public surface); this crate exists so the "core kernel" / "file
//! formats" boundary the workspace draws stays meaningful, and so a future
//! additional waveform dialect has somewhere to live without growing the
//! kernel crate.

use logisim_core::{SimError, Simulator};
use std::path::Path;
use thiserror::Error;

/// Errors surfaced by this crate's format wrappers.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Core error: {0}")]
    CoreError(#[from] SimError),
}

pub type FormatResult<T> = Result<T, FormatError>;

/// Export `sim`'s accumulated trace as a value-change-dump file at `path`.
pub fn export_vcd(sim: &Simulator, path: impl AsRef<Path>) -> FormatResult<()> {
    sim.dump_waveform(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use logisim_core::{Component, Event, GateKind, Timestamp, Value};

    #[test]
    fn exports_vcd_through_the_kernel() {
        let mut sim = Simulator::new();
        let a = sim.create_signal("A", Value::Zero).unwrap();
        let y = sim.create_signal("Y", Value::Unknown).unwrap();
        let not_gate = sim.add_component(Component::gate(GateKind::Not, Some(50)));
        sim.connect_input(not_gate, a).unwrap();
        sim.connect_output(not_gate, y).unwrap();
        sim.enable_trace();
        sim.schedule_event(Event::new(Timestamp(0), a, Value::One))
            .unwrap();
        sim.run_all().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inverter.vcd");
        export_vcd(&sim, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("$enddefinitions $end"));
    }
}
