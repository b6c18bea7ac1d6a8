//! Kernel-wide error type.
//!
//! Every fallible entry point returns `Result<_, SimError>`. Nothing inside
//! the kernel retries or recovers from one of these; they always indicate a
//! misuse by the caller and are surfaced with enough context (a signal name,
//! an event, a file path) to diagnose it.

use crate::event::Event;
use crate::signal::SignalId;
use thiserror::Error;

/// Errors raised by the simulation kernel.
#[derive(Error, Debug)]
pub enum SimError {
    /// A constructor argument failed validation (e.g. an empty signal name).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two signals were registered with the same name in one simulator.
    #[error("duplicate signal name: {0}")]
    DuplicateName(String),

    /// `pop_next`/`peek_time` was called on a drained event queue.
    #[error("event queue is empty")]
    Empty,

    /// An event referenced a signal id that isn't registered.
    #[error("event {event:?} references unknown signal {signal_id:?}")]
    UnknownSignal {
        event: Event,
        signal_id: SignalId,
    },

    /// The waveform file could not be opened or written.
    #[error("I/O error writing waveform to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A configured event-count or simulated-time budget was exceeded.
    ///
    /// Disabled by default (see [`crate::simulator::SimulatorConfig`]); only
    /// raised when the caller opted in via `Simulator::with_config`.
    #[error("simulation budget exceeded: {0}")]
    Budget(String),
}

/// Convenience alias used throughout the kernel.
pub type SimResult<T> = Result<T, SimError>;
