//! Rental Projection CLI
//!
//! Runs one simulation from a JSON investment document and prints the year
//! table with the headline indicators.

use anyhow::{Context, Result};
use clap::Parser;
use rental_projection::{
    check_eligibility, load_parameters, ProjectionConfig, ProjectionEngine, SimulationResult,
};

#[derive(Parser)]
#[command(name = "rental_projection")]
#[command(version, about = "Project cash flows, taxes and returns of a rental investment")]
struct Cli {
    /// Path to the investment JSON document
    params: String,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Number of projected years shown in the table
    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Calendar year of projection year 1 (defaults to START_YEAR or the current year)
    #[arg(long)]
    start_year: Option<i32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let params = load_parameters(&cli.params)
        .with_context(|| format!("reading investment from {}", cli.params))?;

    let mut config = ProjectionConfig::from_env();
    if cli.start_year.is_some() {
        config.start_year = cli.start_year;
    }

    let issues = check_eligibility(&params);
    for issue in &issues {
        eprintln!("warning: {issue}");
    }

    let result = ProjectionEngine::new(config)
        .simulate(&params)
        .context("running simulation")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result, cli.rows);
    }

    Ok(())
}

fn print_report(result: &SimulationResult, rows: usize) {
    println!("Regime: {}", result.regime.label());
    println!(
        "Acquisition cost: {:.2}   Initial outlay: {:.2}   Monthly payment: {:.2}",
        result.acquisition_cost, result.initial_outlay, result.monthly_payment
    );
    if result.loan_cost.total_cost > 0.0 {
        println!(
            "Loan: {:.2}/month with insurance, cost of credit {:.2} (interest {:.2}, insurance {:.2})",
            result.loan_cost.monthly_total(),
            result.loan_cost.total_cost,
            result.loan_cost.total_interest,
            result.loan_cost.total_insurance
        );
    }
    println!();

    println!(
        "{:>4} {:>6} {:>11} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12}",
        "Year", "Cal", "Rent", "Charges", "Interest", "Principal", "Tax", "Reduction", "Cash flow", "Cumulative"
    );
    println!("{}", "-".repeat(104));

    for year in result.years.iter().take(rows) {
        println!(
            "{:>4} {:>6} {:>11.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.2} {:>12.2}",
            year.year,
            year.calendar_year,
            year.effective_rent,
            year.charges,
            year.interest,
            year.principal,
            year.total_tax,
            year.incentive_reduction,
            year.cash_flow_after_tax,
            year.cumulative_cash_flow,
        );
    }
    if result.years.len() > rows {
        println!("... ({} more years)", result.years.len() - rows);
    }

    println!("\nIndicators:");
    println!(
        "  Yield gross / net / net-net: {:.2}% / {:.2}% / {:.2}%",
        result.gross_yield, result.net_yield, result.net_net_yield
    );
    println!("  Monthly cash flow (year 1): {:.2}", result.monthly_cash_flow);
    for horizon in &result.irr {
        if horizon.irr_pct == 0.0 {
            println!("  IRR {:>2} years: n/a", horizon.years);
        } else {
            println!(
                "  IRR {:>2} years: {:.2}% (over {} projected years)",
                horizon.years, horizon.irr_pct, horizon.years_used
            );
        }
    }
    println!("  ROI: {:.1}%", result.roi);
    match result.payback_year {
        Some(year) => println!("  Payback year: {year}"),
        None => println!("  Payback year: not reached"),
    }
    println!("  Total tax paid: {:.2}", result.total_tax_paid);
    if result.total_incentive_reduction > 0.0 {
        println!(
            "  Tax reduction scheduled / used: {:.2} / {:.2}",
            result.total_incentive_reduction, result.total_incentive_reduction_used
        );
    }

    println!("\nResale at end of horizon:");
    println!("  Price: {:.2}", result.resale_price);
    println!(
        "  Gross gain: {:.2}   Tax: {:.2}   Net gain: {:.2}",
        result.gross_capital_gain, result.capital_gains_tax, result.net_capital_gain
    );
    println!("  Net proceeds: {:.2}", result.net_resale_proceeds);
}
