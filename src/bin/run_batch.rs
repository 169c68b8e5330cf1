//! Run every scenario of a CSV sheet in parallel
//!
//! Prints one summary line per scenario, or a JSON array with --json.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rental_projection::scenario::ScenarioOutcome;
use rental_projection::{load_scenarios, ProjectionConfig, ScenarioRunner, SimulationSummary};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "run_batch")]
#[command(version, about = "Parallel sweep over a scenario sheet")]
struct Cli {
    /// Path to the scenarios CSV sheet
    scenarios: String,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct BatchLine {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<SimulationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ScenarioOutcome> for BatchLine {
    fn from(outcome: ScenarioOutcome) -> Self {
        match outcome.result {
            Ok(result) => BatchLine {
                name: outcome.name,
                summary: Some(result.summary()),
                error: None,
            },
            Err(e) => BatchLine {
                name: outcome.name,
                summary: None,
                error: Some(e.to_string()),
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let scenarios = load_scenarios(&cli.scenarios)
        .with_context(|| format!("loading scenarios from {}", cli.scenarios))?;

    let runner = ScenarioRunner::new(ProjectionConfig::from_env());
    let lines: Vec<BatchLine> = runner
        .run_batch(&scenarios)
        .into_iter()
        .map(BatchLine::from)
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    println!(
        "{:<20} {:<14} {:>8} {:>8} {:>10} {:>8} {:>8} {:>8}",
        "Scenario", "Regime", "Gross %", "NetNet %", "CF/month", "IRR %", "ROI %", "Payback"
    );
    println!("{}", "-".repeat(92));

    let mut failures = 0;
    for line in &lines {
        match (&line.summary, &line.error) {
            (Some(s), _) => println!(
                "{:<20} {:<14} {:>8.2} {:>8.2} {:>10.2} {:>8.2} {:>8.1} {:>8}",
                line.name,
                s.regime,
                s.gross_yield,
                s.net_net_yield,
                s.monthly_cash_flow,
                s.irr_first_horizon,
                s.roi,
                s.payback_year.map_or("-".to_string(), |y| y.to_string()),
            ),
            (None, error) => {
                failures += 1;
                println!("{:<20} error: {}", line.name, error.as_deref().unwrap_or("unknown"));
            }
        }
    }

    println!(
        "\n{} scenarios ({} failed) in {:?}",
        lines.len(),
        failures,
        start.elapsed()
    );
    Ok(())
}
