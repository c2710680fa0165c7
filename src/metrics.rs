//! Raw sample collection and summary aggregation
//!
//! The store is append-only during a run: wait samples at every phase
//! boundary, periodic queue-length and in-use snapshots from the sampler,
//! and two counters. Aggregation is a pure function over the collected
//! sequences; every statistic is 0 on empty input, never a division error.

use serde::{Deserialize, Serialize};

/// Raw samples and counters collected during a run
#[derive(Debug, Default, Clone)]
pub struct MetricsStore {
    runway_wait_landing: Vec<f64>,
    runway_wait_takeoff: Vec<f64>,
    gate_wait: Vec<f64>,
    total_times: Vec<f64>,

    runway_queue_snapshots: Vec<(f64, usize)>,
    gate_queue_snapshots: Vec<(f64, usize)>,
    runway_in_use_snapshots: Vec<(f64, usize)>,
    gate_in_use_snapshots: Vec<(f64, usize)>,

    arrived: u64,
    departed: u64,
}

/// Summary record for one run; the entire contract with downstream consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub avg_runway_wait_landing: f64,
    pub avg_runway_wait_takeoff: f64,
    pub avg_gate_wait: f64,
    pub avg_total_time: f64,
    pub max_runway_wait_landing: f64,
    pub max_runway_wait_takeoff: f64,
    pub max_gate_wait: f64,
    pub runway_utilization_pct: f64,
    pub gate_utilization_pct: f64,
    pub throughput_per_hour: f64,
    pub total_arrived: u64,
    pub total_departed: u64,
}

impl MetricsStore {
    pub fn new() -> Self {
        MetricsStore::default()
    }

    pub fn record_runway_wait_landing(&mut self, wait: f64) {
        self.runway_wait_landing.push(wait);
    }

    pub fn record_runway_wait_takeoff(&mut self, wait: f64) {
        self.runway_wait_takeoff.push(wait);
    }

    pub fn record_gate_wait(&mut self, wait: f64) {
        self.gate_wait.push(wait);
    }

    pub fn record_total_time(&mut self, total: f64) {
        self.total_times.push(total);
    }

    pub fn record_arrival(&mut self) {
        self.arrived += 1;
    }

    pub fn record_departure(&mut self) {
        self.departed += 1;
    }

    /// Record current pending-queue lengths for both resources.
    pub fn snapshot_queues(&mut self, time: f64, runway_queue: usize, gate_queue: usize) {
        self.runway_queue_snapshots.push((time, runway_queue));
        self.gate_queue_snapshots.push((time, gate_queue));
    }

    /// Record current occupant counts for both resources.
    pub fn snapshot_in_use(&mut self, time: f64, runway_in_use: usize, gates_in_use: usize) {
        self.runway_in_use_snapshots.push((time, runway_in_use));
        self.gate_in_use_snapshots.push((time, gates_in_use));
    }

    pub fn arrived(&self) -> u64 {
        self.arrived
    }

    pub fn departed(&self) -> u64 {
        self.departed
    }

    /// Reduce the collected samples to the summary record.
    ///
    /// Pure with respect to the store: calling it twice without new samples
    /// in between yields identical results.
    pub fn summary(&self, horizon_minutes: f64, runways: usize, gates: usize) -> SimulationSummary {
        let throughput_per_hour = if horizon_minutes > 0.0 {
            self.departed as f64 / horizon_minutes * 60.0
        } else {
            0.0
        };

        SimulationSummary {
            avg_runway_wait_landing: mean(&self.runway_wait_landing),
            avg_runway_wait_takeoff: mean(&self.runway_wait_takeoff),
            avg_gate_wait: mean(&self.gate_wait),
            avg_total_time: mean(&self.total_times),
            max_runway_wait_landing: max(&self.runway_wait_landing),
            max_runway_wait_takeoff: max(&self.runway_wait_takeoff),
            max_gate_wait: max(&self.gate_wait),
            runway_utilization_pct: utilization_pct(&self.runway_in_use_snapshots, runways),
            gate_utilization_pct: utilization_pct(&self.gate_in_use_snapshots, gates),
            throughput_per_hour,
            total_arrived: self.arrived,
            total_departed: self.departed,
        }
    }
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

fn max(samples: &[f64]) -> f64 {
    samples.iter().copied().fold(0.0, f64::max)
}

// Time-average of in-use counts over the snapshot series, as a percentage
// of capacity.
fn utilization_pct(snapshots: &[(f64, usize)], capacity: usize) -> f64 {
    if snapshots.is_empty() || capacity == 0 {
        return 0.0;
    }
    let total: usize = snapshots.iter().map(|(_, in_use)| in_use).sum();
    (total as f64 / snapshots.len() as f64) / capacity as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_summarizes_to_zero() {
        let store = MetricsStore::new();
        let summary = store.summary(720.0, 1, 8);

        assert_eq!(summary.avg_runway_wait_landing, 0.0);
        assert_eq!(summary.avg_runway_wait_takeoff, 0.0);
        assert_eq!(summary.avg_gate_wait, 0.0);
        assert_eq!(summary.avg_total_time, 0.0);
        assert_eq!(summary.max_gate_wait, 0.0);
        assert_eq!(summary.runway_utilization_pct, 0.0);
        assert_eq!(summary.gate_utilization_pct, 0.0);
        assert_eq!(summary.throughput_per_hour, 0.0);
        assert_eq!(summary.total_arrived, 0);
        assert_eq!(summary.total_departed, 0);
    }

    #[test]
    fn test_zero_horizon_yields_zero_throughput() {
        let mut store = MetricsStore::new();
        store.record_departure();
        let summary = store.summary(0.0, 1, 8);
        assert_eq!(summary.throughput_per_hour, 0.0);
    }

    #[test]
    fn test_wait_statistics() {
        let mut store = MetricsStore::new();
        store.record_gate_wait(2.0);
        store.record_gate_wait(4.0);
        store.record_gate_wait(12.0);

        let summary = store.summary(720.0, 1, 8);
        assert_eq!(summary.avg_gate_wait, 6.0);
        assert_eq!(summary.max_gate_wait, 12.0);
    }

    #[test]
    fn test_utilization_is_mean_over_capacity() {
        let mut store = MetricsStore::new();
        // Gate occupancy 4, 8, 0 out of 8 gates -> mean 4 -> 50%
        store.snapshot_in_use(0.0, 1, 4);
        store.snapshot_in_use(1.0, 1, 8);
        store.snapshot_in_use(2.0, 0, 0);

        let summary = store.summary(3.0, 1, 8);
        assert_eq!(summary.gate_utilization_pct, 50.0);
        // Runway in use 1, 1, 0 of 1 -> mean 2/3 -> 66.7%
        assert!((summary.runway_utilization_pct - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_throughput_per_hour() {
        let mut store = MetricsStore::new();
        for _ in 0..36 {
            store.record_departure();
        }
        let summary = store.summary(720.0, 1, 8);
        assert_eq!(summary.throughput_per_hour, 3.0);
    }

    #[test]
    fn test_summary_is_idempotent() {
        let mut store = MetricsStore::new();
        store.record_arrival();
        store.record_runway_wait_landing(1.5);
        store.record_total_time(64.0);
        store.snapshot_queues(0.0, 2, 0);
        store.snapshot_in_use(0.0, 1, 3);

        let first = store.summary(720.0, 1, 8);
        let second = store.summary(720.0, 1, 8);
        assert_eq!(first, second);
    }
}
