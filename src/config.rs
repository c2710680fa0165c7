//! Simulation run configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Parameters for one simulation run.
///
/// Supplied by the external driver (CLI, scenario sweep). Validated once,
/// before any event executes; a rejected configuration never starts a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulated-time cutoff in minutes
    pub horizon_minutes: f64,
    /// Mean minutes between aircraft arrivals (exponential spacing)
    pub arrival_mean: f64,
    /// Number of runways (shared by landings and takeoffs)
    pub runways: usize,
    /// Number of gates
    pub gates: usize,
    /// Shortest gate turnaround service in minutes
    pub gate_service_min: u32,
    /// Longest gate turnaround service in minutes
    pub gate_service_max: u32,
    /// Serve departures before arrivals on the runway queue
    pub priority_departures: bool,
    /// Random seed; identical seed and configuration reproduce the run exactly
    pub seed: u64,
    /// Minutes between queue-length and utilization snapshots
    pub sample_interval: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            horizon_minutes: 720.0,
            arrival_mean: 10.0,
            runways: 1,
            gates: 8,
            gate_service_min: 45,
            gate_service_max: 90,
            priority_departures: false,
            seed: 42,
            sample_interval: 1.0,
        }
    }
}

impl SimulationConfig {
    /// Check every parameter against its constraint.
    pub fn validate(&self) -> Result<()> {
        if !self.horizon_minutes.is_finite() || self.horizon_minutes <= 0.0 {
            return Err(SimulationError::config(format!(
                "horizon must be a positive number of minutes, got {}",
                self.horizon_minutes
            )));
        }
        if !self.arrival_mean.is_finite() || self.arrival_mean <= 0.0 {
            return Err(SimulationError::config(format!(
                "arrival mean must be a positive number of minutes, got {}",
                self.arrival_mean
            )));
        }
        if self.runways == 0 {
            return Err(SimulationError::config("runway count must be at least 1"));
        }
        if self.gates == 0 {
            return Err(SimulationError::config("gate count must be at least 1"));
        }
        if self.gate_service_min == 0 || self.gate_service_min > self.gate_service_max {
            return Err(SimulationError::config(format!(
                "gate service range must satisfy 0 < min <= max, got [{}, {}]",
                self.gate_service_min, self.gate_service_max
            )));
        }
        if !self.sample_interval.is_finite() || self.sample_interval <= 0.0 {
            return Err(SimulationError::config(format!(
                "sample interval must be a positive number of minutes, got {}",
                self.sample_interval
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_horizon() {
        let config = SimulationConfig {
            horizon_minutes: 0.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_nonpositive_arrival_mean() {
        let config = SimulationConfig {
            arrival_mean: -3.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let no_runways = SimulationConfig {
            runways: 0,
            ..SimulationConfig::default()
        };
        assert!(no_runways.validate().is_err());

        let no_gates = SimulationConfig {
            gates: 0,
            ..SimulationConfig::default()
        };
        assert!(no_gates.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_gate_range() {
        let config = SimulationConfig {
            gate_service_min: 90,
            gate_service_max: 45,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_gate_minimum() {
        let config = SimulationConfig {
            gate_service_min: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
