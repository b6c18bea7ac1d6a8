//! Tri-valued logic.
//!
//! Every signal and event payload in the kernel carries a [`Value`]: one of
//! the three symbols a real gate can drive or sense — logic low, logic high,
//! or "unknown" (an uninitialized or not-yet-driven net).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single bit of tri-valued logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Logic low (`0`).
    Zero,
    /// Logic high (`1`).
    One,
    /// Unknown / uninitialized (`X`).
    Unknown,
}

impl Value {
    /// `NOT` over a single tri-valued input.
    pub fn not(self) -> Value {
        match self {
            Value::Zero => Value::One,
            Value::One => Value::Zero,
            Value::Unknown => Value::Unknown,
        }
    }

    /// `AND` of two tri-valued inputs: `0` dominates, else `X` dominates,
    /// else `1`.
    pub fn and(self, other: Value) -> Value {
        match (self, other) {
            (Value::Zero, _) | (_, Value::Zero) => Value::Zero,
            (Value::Unknown, _) | (_, Value::Unknown) => Value::Unknown,
            (Value::One, Value::One) => Value::One,
        }
    }

    /// `OR` of two tri-valued inputs: `1` dominates, else `X` dominates,
    /// else `0`.
    ///
    /// `1 OR X` resolves to `1` (standard three-valued logic), not `X` —
    /// see the "Open Questions" note in the design docs.
    pub fn or(self, other: Value) -> Value {
        match (self, other) {
            (Value::One, _) | (_, Value::One) => Value::One,
            (Value::Unknown, _) | (_, Value::Unknown) => Value::Unknown,
            (Value::Zero, Value::Zero) => Value::Zero,
        }
    }

    /// `XOR` of two tri-valued inputs: any `X` yields `X`, else parity.
    pub fn xor(self, other: Value) -> Value {
        match (self, other) {
            (Value::Unknown, _) | (_, Value::Unknown) => Value::Unknown,
            (a, b) => Value::from_bool(a.to_bool() != b.to_bool()),
        }
    }

    /// `AND` reduction over an arbitrary number of inputs.
    pub fn and_all(inputs: impl IntoIterator<Item = Value>) -> Value {
        inputs
            .into_iter()
            .fold(Value::One, |acc, v| acc.and(v))
    }

    /// `OR` reduction over an arbitrary number of inputs.
    pub fn or_all(inputs: impl IntoIterator<Item = Value>) -> Value {
        inputs
            .into_iter()
            .fold(Value::Zero, |acc, v| acc.or(v))
    }

    /// `XOR` reduction (parity) over an arbitrary number of inputs: any `X`
    /// makes the whole reduction `X`, otherwise the result is `1` iff an odd
    /// number of inputs are `1`.
    pub fn xor_all(inputs: impl IntoIterator<Item = Value>) -> Value {
        let mut ones = 0usize;
        for v in inputs {
            match v {
                Value::Unknown => return Value::Unknown,
                Value::One => ones += 1,
                Value::Zero => {}
            }
        }
        Value::from_bool(ones % 2 == 1)
    }

    fn to_bool(self) -> Option<bool> {
        match self {
            Value::Zero => Some(false),
            Value::One => Some(true),
            Value::Unknown => None,
        }
    }

    fn from_bool(b: bool) -> Value {
        if b {
            Value::One
        } else {
            Value::Zero
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Value::Zero => '0',
            Value::One => '1',
            Value::Unknown => 'X',
        };
        write!(f, "{c}")
    }
}

impl std::ops::Not for Value {
    type Output = Value;

    fn not(self) -> Value {
        Value::not(self)
    }
}
