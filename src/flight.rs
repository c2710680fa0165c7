//! Flight state machine types
//!
//! A flight is a scripted, linear sequence of phases: land, taxi in, turn
//! around at a gate, taxi out, take off. All transitions are driven by the
//! simulator; the flight itself is plain data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable handle for a flight in the simulator's arena
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FlightId(pub u64);

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flight-{:03}", self.0)
    }
}

/// Where a flight currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightPhase {
    Arriving,
    AwaitingLandingRunway,
    Landing,
    TaxiToGate,
    AwaitingGate,
    AtGate,
    TaxiToRunway,
    AwaitingTakeoffRunway,
    TakingOff,
    Departed,
}

/// One flight's state, owned by the simulator for its lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: FlightId,
    pub arrival_time: f64,
    pub phase: FlightPhase,
    /// When the current resource wait began; meaningful in `Awaiting*` phases
    pub wait_started: f64,
}

impl Flight {
    pub fn new(id: FlightId, arrival_time: f64) -> Self {
        Flight {
            id,
            arrival_time,
            phase: FlightPhase::Arriving,
            wait_started: arrival_time,
        }
    }

    /// Enter a waiting phase and mark when the wait began.
    pub fn begin_wait(&mut self, phase: FlightPhase, now: f64) {
        self.phase = phase;
        self.wait_started = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_flight_starts_arriving() {
        let flight = Flight::new(FlightId(1), 12.5);
        assert_eq!(flight.phase, FlightPhase::Arriving);
        assert_eq!(flight.arrival_time, 12.5);
    }

    #[test]
    fn test_begin_wait_marks_start() {
        let mut flight = Flight::new(FlightId(1), 0.0);
        flight.begin_wait(FlightPhase::AwaitingGate, 37.0);
        assert_eq!(flight.phase, FlightPhase::AwaitingGate);
        assert_eq!(flight.wait_started, 37.0);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(FlightId(7).to_string(), "Flight-007");
        assert_eq!(FlightId(123).to_string(), "Flight-123");
    }
}
