//! Error types for the simulation engine

use thiserror::Error;

/// Simulation result type
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors that can occur while configuring or running a simulation
#[derive(Error, Debug)]
pub enum SimulationError {
    /// An input parameter violates its stated constraint. Raised before any
    /// event executes; the run never starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An internal defensive check failed. The in-progress run is aborted,
    /// since continuing would invalidate every downstream statistic.
    #[error("Invariant violation at t={time:.1}: {message}")]
    InvariantViolation { time: f64, message: String },

    /// Attempted to advance the clock with no pending events. Normal
    /// termination inside the run loop, a programming error elsewhere.
    #[error("Event queue is empty")]
    EmptyQueue,
}

impl SimulationError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invariant violation with diagnostic context
    pub fn invariant(time: f64, msg: impl Into<String>) -> Self {
        Self::InvariantViolation {
            time,
            message: msg.into(),
        }
    }
}
