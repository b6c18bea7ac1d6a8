//! Literal value-change-dump waveform serializer (spec.md §6).
//!
//! The dialect is narrow and fixed — one `top` scope, one-bit `wire`
//! signals, identifiers equal to the signal's own numeric id — so it is
//! written directly against `std::io` rather than pulled in from a general
//! waveform-format crate (there is no such dependency in the workspace and
//! the format has exactly one required shape).

use crate::error::{SimError, SimResult};
use crate::signal::{Signal, SignalId};
use crate::trace::TraceLog;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub(crate) fn dump(
    signals: &IndexMap<SignalId, Signal>,
    initial_values: &IndexMap<SignalId, Value>,
    name_index: &HashMap<String, SignalId>,
    trace: &TraceLog,
    path: &Path,
) -> SimResult<()> {
    let file = std::fs::File::create(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut out = std::io::BufWriter::new(file);
    write_body(&mut out, signals, initial_values, name_index, trace)
        .map_err(|source| SimError::Io {
            path: path.display().to_string(),
            source,
        })
}

fn write_body(
    out: &mut impl Write,
    signals: &IndexMap<SignalId, Signal>,
    initial_values: &IndexMap<SignalId, Value>,
    name_index: &HashMap<String, SignalId>,
    trace: &TraceLog,
) -> std::io::Result<()> {
    writeln!(out, "$date")?;
    writeln!(out, "  Digital Logic Simulator")?;
    writeln!(out, "$end")?;
    writeln!(out, "$timescale 1ps $end")?;
    writeln!(out, "$scope module top $end")?;
    for signal in signals.values() {
        writeln!(out, "$var wire 1 {} {} $end", signal.id().0, signal.name())?;
    }
    writeln!(out, "$upscope $end")?;
    writeln!(out, "$enddefinitions $end")?;
    writeln!(out)?;
    writeln!(out, "$dumpvars")?;
    for signal in signals.values() {
        let initial = initial_values
            .get(&signal.id())
            .copied()
            .unwrap_or(Value::Unknown);
        writeln!(out, "{}{}", initial, signal.id().0)?;
    }
    writeln!(out, "$end")?;

    let mut last_time = 0u64;
    let mut first_change = true;
    for record in trace.records() {
        if first_change || record.time.0 != last_time {
            writeln!(out, "#{}", record.time.0)?;
            last_time = record.time.0;
            first_change = false;
        }
        if let Some(id) = name_index.get(&record.signal_name) {
            writeln!(out, "{}{}", record.new_value, id.0)?;
        }
    }
    if !trace.records().is_empty() {
        writeln!(out, "#{}", last_time + 100)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Timestamp;

    #[test]
    fn writes_literal_vcd_shape() {
        let mut signals = IndexMap::new();
        let a = SignalId(0);
        let y = SignalId(1);
        signals.insert(a, Signal::new(a, "A".to_string(), Value::Zero).unwrap());
        signals.insert(y, Signal::new(y, "Y".to_string(), Value::Unknown).unwrap());

        let mut initial_values = IndexMap::new();
        initial_values.insert(a, Value::Zero);
        initial_values.insert(y, Value::Unknown);

        let mut name_index = HashMap::new();
        name_index.insert("A".to_string(), a);
        name_index.insert("Y".to_string(), y);

        let mut trace = TraceLog::new();
        trace.push(Timestamp(100), "Y".to_string(), Value::Unknown, Value::One);

        let mut buf = Vec::new();
        write_body(&mut buf, &signals, &initial_values, &name_index, &trace).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("$var wire 1 0 A $end"));
        assert!(text.contains("$var wire 1 1 Y $end"));
        assert!(text.contains("00\n")); // initial value of A
        assert!(text.contains("X1\n")); // initial value of Y
        assert!(text.contains("#100\n"));
        assert!(text.contains("11\n")); // Y -> 1 at t=100
        assert!(text.trim_end().ends_with("#200"));
    }

    #[test]
    fn no_trailing_marker_when_no_changes_recorded() {
        let mut signals = IndexMap::new();
        let a = SignalId(0);
        signals.insert(a, Signal::new(a, "A".to_string(), Value::Zero).unwrap());
        let mut initial_values = IndexMap::new();
        initial_values.insert(a, Value::Zero);
        let name_index = HashMap::new();
        let trace = TraceLog::new();

        let mut buf = Vec::new();
        write_body(&mut buf, &signals, &initial_values, &name_index, &trace).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains('#'));
    }
}
