//! Airfield Simulation Engine CLI
//!
//! Scenario driver for the simulation core: runs a single configuration or
//! the built-in comparison table and prints the resulting summary records.

use clap::Parser;
use serde::Serialize;
use std::fs;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airfield_simulation_engine::{
    config::SimulationConfig,
    error::SimulationError,
    metrics::SimulationSummary,
    simulator::Simulator,
};

#[derive(Parser, Debug)]
#[command(name = "airfield-sim")]
#[command(about = "Simulate runway and gate contention at an airport", long_about = None)]
struct Args {
    /// Simulation horizon in minutes
    #[arg(long, default_value_t = 720.0)]
    horizon: f64,

    /// Mean minutes between aircraft arrivals
    #[arg(long, default_value_t = 10.0)]
    arrival_mean: f64,

    /// Number of runways
    #[arg(short, long, default_value_t = 1)]
    runways: usize,

    /// Number of gates
    #[arg(short, long, default_value_t = 8)]
    gates: usize,

    /// Shortest gate turnaround in minutes
    #[arg(long, default_value_t = 45)]
    gate_min: u32,

    /// Longest gate turnaround in minutes
    #[arg(long, default_value_t = 90)]
    gate_max: u32,

    /// Serve departures before arrivals on the runway queue
    #[arg(long)]
    priority_departures: bool,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Run the built-in scenario comparison table instead of a single run
    #[arg(long)]
    compare: bool,

    /// Output JSON file path (optional)
    #[arg(short, long)]
    output: Option<String>,
}

/// One scenario's label and summary, for the comparison table and JSON output
#[derive(Debug, Serialize)]
struct ScenarioResult {
    label: String,
    #[serde(flatten)]
    summary: SimulationSummary,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let results = if args.compare {
        run_comparison(&args)
    } else {
        run_single(&args)
    };

    let results = match results {
        Ok(results) => results,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(output_path) = &args.output {
        let json = match serde_json::to_string_pretty(&results) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("error: failed to serialize results: {e}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = fs::write(output_path, json) {
            eprintln!("error: failed to write {output_path}: {e}");
            return ExitCode::FAILURE;
        }
        println!("\nResults saved to {output_path}");
    }

    ExitCode::SUCCESS
}

fn config_from_args(args: &Args) -> SimulationConfig {
    SimulationConfig {
        horizon_minutes: args.horizon,
        arrival_mean: args.arrival_mean,
        runways: args.runways,
        gates: args.gates,
        gate_service_min: args.gate_min,
        gate_service_max: args.gate_max,
        priority_departures: args.priority_departures,
        seed: args.seed,
        sample_interval: 1.0,
    }
}

fn run_single(args: &Args) -> Result<Vec<ScenarioResult>, SimulationError> {
    let config = config_from_args(args);
    let label = format!(
        "{} Runway{} / {} Gates",
        config.runways,
        if config.runways == 1 { "" } else { "s" },
        config.gates
    );
    let summary = Simulator::new(config)?.run()?;

    print_summary(&label, &summary);
    Ok(vec![ScenarioResult { label, summary }])
}

fn run_comparison(args: &Args) -> Result<Vec<ScenarioResult>, SimulationError> {
    // Paired scenarios: base case vs test case, compared side by side.
    let scenarios: [(usize, usize, u32, u32, bool, &str); 6] = [
        (1, 8, 45, 90, false, "1 Runway / 8 Gates"),
        (2, 10, 45, 90, false, "2 Runways / 10 Gates"),
        (1, 8, 45, 90, false, "Gate time 45-90 mins (slower)"),
        (1, 8, 30, 60, false, "Gate time 30-60 mins (faster)"),
        (1, 8, 45, 90, false, "FCFS"),
        (1, 8, 45, 90, true, "Priority for Departures"),
    ];

    let mut results = Vec::with_capacity(scenarios.len());
    for (runways, gates, gate_min, gate_max, priority, label) in scenarios {
        let config = SimulationConfig {
            horizon_minutes: args.horizon,
            arrival_mean: args.arrival_mean,
            runways,
            gates,
            gate_service_min: gate_min,
            gate_service_max: gate_max,
            priority_departures: priority,
            seed: args.seed,
            sample_interval: 1.0,
        };
        let summary = Simulator::new(config)?.run()?;
        results.push(ScenarioResult {
            label: label.to_string(),
            summary,
        });
    }

    println!("\n=== Scenario Comparison ===");
    println!(
        "{:<32} {:>10} {:>10} {:>10} {:>11} {:>9} {:>12}",
        "Scenario", "Wait(L)", "Wait(T)", "GateWait", "RunwayUtil", "GateUtil", "Throughput"
    );
    println!("{}", "-".repeat(98));
    for result in &results {
        let s = &result.summary;
        println!(
            "{:<32} {:>10.2} {:>10.2} {:>10.2} {:>10.1}% {:>8.1}% {:>10.1}/hr",
            result.label,
            s.avg_runway_wait_landing,
            s.avg_runway_wait_takeoff,
            s.avg_gate_wait,
            s.runway_utilization_pct,
            s.gate_utilization_pct,
            s.throughput_per_hour,
        );
    }

    Ok(results)
}

fn print_summary(label: &str, summary: &SimulationSummary) {
    println!("\n{}", "=".repeat(70));
    println!("SIMULATION SUMMARY - {label}");
    println!("{}", "=".repeat(70));
    println!("Total aircraft arrived: {}", summary.total_arrived);
    println!("Total aircraft departed: {}", summary.total_departed);
    println!("\nWait Times:");
    println!(
        "  Avg runway wait (landing): {:.2} min",
        summary.avg_runway_wait_landing
    );
    println!(
        "  Avg runway wait (takeoff): {:.2} min",
        summary.avg_runway_wait_takeoff
    );
    println!("  Avg gate wait: {:.2} min", summary.avg_gate_wait);
    println!("\nResource Utilization:");
    println!(
        "  Runway utilization: {:.1}%",
        summary.runway_utilization_pct
    );
    println!("  Gate utilization: {:.1}%", summary.gate_utilization_pct);
    println!("\nThroughput:");
    println!("  Aircraft per hour: {:.1}", summary.throughput_per_hour);
    println!("\nWorst Case:");
    println!(
        "  Max runway wait (landing): {:.2} min",
        summary.max_runway_wait_landing
    );
    println!(
        "  Max runway wait (takeoff): {:.2} min",
        summary.max_runway_wait_takeoff
    );
    println!("  Max gate wait: {:.2} min", summary.max_gate_wait);
    println!("\nSystem Performance:");
    println!(
        "  Avg total time in system: {:.2} min",
        summary.avg_total_time
    );
    println!("{}", "=".repeat(70));
}
