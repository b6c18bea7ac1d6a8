//! Append-only value-change trace log (spec.md §4.I).

use crate::event::Timestamp;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One observed change: `signal_name` went from `old_value` to `new_value`
/// at `time`. Only ever appended for an *actual* change while tracing is
/// enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub time: Timestamp,
    pub signal_name: String,
    pub old_value: Value,
    pub new_value: Value,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>10} | {:<15} | {} -> {}",
            self.time.0, self.signal_name, self.old_value, self.new_value
        )
    }
}

/// The simulator's trace log: append-only while enabled.
///
/// `enable_trace` clears the log and sets the flag; `disable_trace` clears
/// only the flag, preserving whatever was recorded so far.
#[derive(Debug, Default)]
pub struct TraceLog {
    records: Vec<TraceRecord>,
}

impl TraceLog {
    pub fn new() -> Self {
        TraceLog {
            records: Vec::new(),
        }
    }

    pub(crate) fn push(
        &mut self,
        time: Timestamp,
        signal_name: String,
        old_value: Value,
        new_value: Value,
    ) {
        self.records.push(TraceRecord {
            time,
            signal_name,
            old_value,
            new_value,
        });
    }

    /// All recorded changes, in the order they occurred.
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}

impl fmt::Display for TraceLog {
    /// A human-readable table, one line per record (spec.md §4.I: the log
    /// is "suitable for a human-readable dump" in addition to VCD export).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} | {:<15} | change", "Time(ps)", "Signal")?;
        for record in &self.records {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_back() {
        let mut log = TraceLog::new();
        log.push(Timestamp(10), "A".to_string(), Value::Zero, Value::One);
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].signal_name, "A");
        assert_eq!(log.records()[0].old_value, Value::Zero);
        assert_eq!(log.records()[0].new_value, Value::One);
    }

    #[test]
    fn clear_empties_records() {
        let mut log = TraceLog::new();
        log.push(Timestamp(0), "A".to_string(), Value::Zero, Value::One);
        log.clear();
        assert!(log.records().is_empty());
    }

    #[test]
    fn display_renders_one_line_per_record() {
        let mut log = TraceLog::new();
        log.push(Timestamp(100), "Y".to_string(), Value::Unknown, Value::One);
        let rendered = log.to_string();
        assert!(rendered.contains("Y"));
        assert!(rendered.contains("X -> 1"));
    }
}
