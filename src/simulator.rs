//! Discrete-event simulator for airfield resource contention
//!
//! Drives aircraft flights through a shared runway and a bank of gates to
//! estimate wait times, utilization, and throughput under alternative
//! operating policies. Execution is single-threaded and cooperative: one
//! flight body runs at a time, suspended at timed delays and ungrantable
//! resource requests, resumed by the event queue in `(time, seq)` order.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::event_queue::{EventQueue, SimEvent};
use crate::flight::{Flight, FlightId, FlightPhase};
use crate::metrics::{MetricsStore, SimulationSummary};
use crate::resource::{QueueDiscipline, Resource};

/// Runway priority for departing flights (served first under contention)
const TAKEOFF_PRIORITY: u32 = 0;
/// Runway priority for arriving flights
const LANDING_PRIORITY: u32 = 1;

/// Runway occupancy and taxi times are drawn from this range, in minutes
const TAXIWAY_RANGE: (u32, u32) = (3, 6);

/// Discrete-event simulator for one configuration
pub struct Simulator {
    config: SimulationConfig,
    now: f64,
    queue: EventQueue,
    runway: Resource,
    gate: Resource,
    flights: HashMap<FlightId, Flight>,
    next_flight_number: u64,
    rng: StdRng,
    interarrival: Exp<f64>,
    metrics: MetricsStore,
}

impl Simulator {
    /// Create a simulator for a validated configuration.
    ///
    /// Rejects the configuration before any event is scheduled; a run that
    /// starts always starts from a consistent state.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let runway_discipline = if config.priority_departures {
            QueueDiscipline::Priority
        } else {
            QueueDiscipline::Fifo
        };
        let interarrival = Exp::new(1.0 / config.arrival_mean)
            .map_err(|e| SimulationError::config(format!("arrival mean: {e}")))?;
        let rng = StdRng::seed_from_u64(config.seed);

        Ok(Simulator {
            runway: Resource::new("runway", config.runways, runway_discipline),
            gate: Resource::new("gate", config.gates, QueueDiscipline::Fifo),
            now: 0.0,
            queue: EventQueue::new(),
            flights: HashMap::new(),
            next_flight_number: 1,
            rng,
            interarrival,
            metrics: MetricsStore::new(),
            config,
        })
    }

    /// Run the simulation to its horizon and return the summary record.
    ///
    /// Events scheduled beyond the horizon, and flights still suspended when
    /// it is reached, are abandoned: no further processing, no cleanup, no
    /// partial samples.
    pub fn run(&mut self) -> Result<SimulationSummary> {
        let horizon = self.config.horizon_minutes;

        // Arrival generator first, sampler second: the generator's draw is
        // the run's first use of the seeded generator.
        let first_arrival = self.draw_interarrival();
        self.queue.schedule(self.now, first_arrival, SimEvent::SpawnFlight);
        self.queue.schedule(self.now, 0.0, SimEvent::Sample);

        while self.queue.next_time().is_some_and(|time| time <= horizon) {
            self.step()?;
        }
        if self.now < horizon {
            self.now = horizon;
        }

        info!(
            arrived = self.metrics.arrived(),
            departed = self.metrics.departed(),
            in_system = self.flights.len(),
            "simulation horizon reached at t={horizon}"
        );
        Ok(self.summary())
    }

    /// Pop the earliest event, advance the clock, and dispatch it.
    pub fn step(&mut self) -> Result<()> {
        let scheduled = self.queue.pop().ok_or(SimulationError::EmptyQueue)?;
        if scheduled.time < self.now {
            return Err(SimulationError::invariant(
                self.now,
                format!("clock would move backward to t={}", scheduled.time),
            ));
        }
        self.now = scheduled.time;

        match scheduled.event {
            SimEvent::SpawnFlight => self.handle_spawn(),
            SimEvent::Resume { flight } => self.resume_flight(flight),
            SimEvent::Sample => {
                self.handle_sample();
                Ok(())
            }
        }
    }

    /// Current simulated time in minutes.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Flights spawned but not yet departed (or abandoned at the horizon).
    pub fn active_flights(&self) -> usize {
        self.flights.len()
    }

    /// Summary record over the samples collected so far.
    pub fn summary(&self) -> SimulationSummary {
        self.metrics
            .summary(self.config.horizon_minutes, self.config.runways, self.config.gates)
    }

    // Spawn one flight, then re-arm the generator with the next
    // exponentially distributed gap.
    fn handle_spawn(&mut self) -> Result<()> {
        let id = FlightId(self.next_flight_number);
        self.next_flight_number += 1;

        self.flights.insert(id, Flight::new(id, self.now));
        self.metrics.record_arrival();
        debug!("{:.1}: {} arriving", self.now, id);
        self.queue.schedule(self.now, 0.0, SimEvent::Resume { flight: id });

        let gap = self.draw_interarrival();
        self.queue.schedule(self.now, gap, SimEvent::SpawnFlight);
        Ok(())
    }

    fn handle_sample(&mut self) {
        self.metrics
            .snapshot_queues(self.now, self.runway.queue_len(), self.gate.queue_len());
        self.metrics
            .snapshot_in_use(self.now, self.runway.in_use(), self.gate.in_use());
        self.queue
            .schedule(self.now, self.config.sample_interval, SimEvent::Sample);
    }

    // Advance a flight's phase machine. The loop carries control through
    // transitions that complete immediately (an uncontended resource grant)
    // and breaks wherever the flight suspends: a timed delay, or a request
    // that has to queue. A queued flight is resumed by the release that
    // grants its slot, with the phase telling it what the resumption means.
    fn resume_flight(&mut self, id: FlightId) -> Result<()> {
        loop {
            let Some(flight) = self.flights.get(&id) else {
                return Err(SimulationError::invariant(
                    self.now,
                    format!("resumed unknown flight {id}"),
                ));
            };
            let (phase, arrival_time, wait_started) =
                (flight.phase, flight.arrival_time, flight.wait_started);

            match phase {
                FlightPhase::Arriving => {
                    let priority = self
                        .config
                        .priority_departures
                        .then_some(LANDING_PRIORITY);
                    let now = self.now;
                    self.flight_mut(id)?
                        .begin_wait(FlightPhase::AwaitingLandingRunway, now);
                    if !self.runway.request(id, priority, self.now)? {
                        debug!(
                            "{:.1}: {} waiting - runway busy with {} plane(s)",
                            self.now,
                            id,
                            self.runway.in_use()
                        );
                        break;
                    }
                }
                FlightPhase::AwaitingLandingRunway => {
                    let wait = self.elapsed_wait(id, wait_started)?;
                    self.metrics.record_runway_wait_landing(wait);
                    let hold = self.draw_minutes(TAXIWAY_RANGE);
                    self.flight_mut(id)?.phase = FlightPhase::Landing;
                    self.queue
                        .schedule(self.now, hold, SimEvent::Resume { flight: id });
                    break;
                }
                FlightPhase::Landing => {
                    self.release_runway()?;
                    let taxi = self.draw_minutes(TAXIWAY_RANGE);
                    self.flight_mut(id)?.phase = FlightPhase::TaxiToGate;
                    self.queue
                        .schedule(self.now, taxi, SimEvent::Resume { flight: id });
                    break;
                }
                FlightPhase::TaxiToGate => {
                    let now = self.now;
                    self.flight_mut(id)?
                        .begin_wait(FlightPhase::AwaitingGate, now);
                    if !self.gate.request(id, None, self.now)? {
                        debug!(
                            "{:.1}: {} waiting - all {} gates full",
                            self.now,
                            id,
                            self.gate.capacity()
                        );
                        break;
                    }
                }
                FlightPhase::AwaitingGate => {
                    let wait = self.elapsed_wait(id, wait_started)?;
                    self.metrics.record_gate_wait(wait);
                    let range = (self.config.gate_service_min, self.config.gate_service_max);
                    let service = self.draw_minutes(range);
                    self.flight_mut(id)?.phase = FlightPhase::AtGate;
                    self.queue
                        .schedule(self.now, service, SimEvent::Resume { flight: id });
                    break;
                }
                FlightPhase::AtGate => {
                    self.release_gate()?;
                    let taxi = self.draw_minutes(TAXIWAY_RANGE);
                    self.flight_mut(id)?.phase = FlightPhase::TaxiToRunway;
                    self.queue
                        .schedule(self.now, taxi, SimEvent::Resume { flight: id });
                    break;
                }
                FlightPhase::TaxiToRunway => {
                    let priority = self
                        .config
                        .priority_departures
                        .then_some(TAKEOFF_PRIORITY);
                    let now = self.now;
                    self.flight_mut(id)?
                        .begin_wait(FlightPhase::AwaitingTakeoffRunway, now);
                    if !self.runway.request(id, priority, self.now)? {
                        debug!("{:.1}: {} waiting for runway", self.now, id);
                        break;
                    }
                }
                FlightPhase::AwaitingTakeoffRunway => {
                    let wait = self.elapsed_wait(id, wait_started)?;
                    self.metrics.record_runway_wait_takeoff(wait);
                    let hold = self.draw_minutes(TAXIWAY_RANGE);
                    self.flight_mut(id)?.phase = FlightPhase::TakingOff;
                    self.queue
                        .schedule(self.now, hold, SimEvent::Resume { flight: id });
                    break;
                }
                FlightPhase::TakingOff => {
                    self.release_runway()?;
                    let total = self.now - arrival_time;
                    if total < 0.0 {
                        return Err(SimulationError::invariant(
                            self.now,
                            format!("{id} departed before it arrived"),
                        ));
                    }
                    self.flight_mut(id)?.phase = FlightPhase::Departed;
                    self.metrics.record_total_time(total);
                    self.metrics.record_departure();
                    debug!(
                        "{:.1}: {} departed after {:.1} min in system",
                        self.now, id, total
                    );
                    self.flights.remove(&id);
                    break;
                }
                FlightPhase::Departed => {
                    return Err(SimulationError::invariant(
                        self.now,
                        format!("{id} resumed after departure"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn release_runway(&mut self) -> Result<()> {
        if let Some(next) = self.runway.release(self.now)? {
            self.queue
                .schedule(self.now, 0.0, SimEvent::Resume { flight: next });
        }
        Ok(())
    }

    fn release_gate(&mut self) -> Result<()> {
        if let Some(next) = self.gate.release(self.now)? {
            self.queue
                .schedule(self.now, 0.0, SimEvent::Resume { flight: next });
        }
        Ok(())
    }

    fn flight_mut(&mut self, id: FlightId) -> Result<&mut Flight> {
        let time = self.now;
        self.flights
            .get_mut(&id)
            .ok_or_else(|| SimulationError::invariant(time, format!("unknown flight {id}")))
    }

    fn elapsed_wait(&self, id: FlightId, wait_started: f64) -> Result<f64> {
        let wait = self.now - wait_started;
        if wait < 0.0 {
            return Err(SimulationError::invariant(
                self.now,
                format!("negative wait of {wait:.3} min recorded for {id}"),
            ));
        }
        Ok(wait)
    }

    fn draw_interarrival(&mut self) -> f64 {
        self.interarrival.sample(&mut self.rng)
    }

    // Service times are whole minutes, uniform and inclusive on both ends.
    fn draw_minutes(&mut self, (min, max): (u32, u32)) -> f64 {
        self.rng.gen_range(min..=max) as f64
    }
}
