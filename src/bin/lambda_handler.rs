//! AWS Lambda handler for running a single simulation
//!
//! Accepts an investment as JSON and returns the simulation result, or
//! `{ "error": ... }` when the input cannot be projected.
//!
//! Supports Lambda Function URLs: when the event carries an HTTP `body`, the
//! investment is read from it and the response is wrapped as an HTTP reply.

use std::time::Instant;

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use rental_projection::{
    check_eligibility, InvestmentParameters, ProjectionConfig, ProjectionEngine, SimulationResult,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Request body: the investment plus optional run settings
#[derive(Debug, Deserialize)]
pub struct SimulationRequest {
    #[serde(flatten)]
    pub params: InvestmentParameters,

    /// Calendar year of projection year 1 (default: START_YEAR or the current year)
    #[serde(default)]
    pub start_year: Option<i32>,

    /// Drop the yearly rows from the response to keep it small
    #[serde(default)]
    pub summary_only: bool,
}

#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SimulationResult>,
    /// Eligibility problems found in the input; the projection still runs
    pub warnings: Vec<String>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn error_response(message: String) -> SimulationResponse {
    SimulationResponse {
        result: None,
        warnings: Vec::new(),
        execution_time_ms: 0,
        error: Some(message),
    }
}

/// Unwrap the Function URL envelope if present
fn request_payload(event: Value) -> Result<Value, String> {
    match event.get("body") {
        Some(Value::String(body)) => {
            serde_json::from_str(body).map_err(|e| format!("invalid JSON body: {e}"))
        }
        Some(Value::Null) => Err("empty request body".to_string()),
        Some(other) => Ok(other.clone()),
        None => Ok(event),
    }
}

fn simulate(payload: Value) -> SimulationResponse {
    let start = Instant::now();

    let request: SimulationRequest = match serde_json::from_value(payload) {
        Ok(request) => request,
        Err(e) => return error_response(format!("invalid request: {e}")),
    };

    let mut config = ProjectionConfig::from_env();
    if request.start_year.is_some() {
        config.start_year = request.start_year;
    }

    let warnings: Vec<String> = check_eligibility(&request.params)
        .iter()
        .map(ToString::to_string)
        .collect();

    match ProjectionEngine::new(config).simulate(&request.params) {
        Ok(mut result) => {
            if request.summary_only {
                result.years.clear();
            }
            let execution_time_ms = start.elapsed().as_millis() as u64;
            info!("Simulation completed in {execution_time_ms} ms");
            SimulationResponse {
                result: Some(result),
                warnings,
                execution_time_ms,
                error: None,
            }
        }
        Err(e) => {
            warn!("Simulation rejected: {e}");
            SimulationResponse {
                warnings,
                ..error_response(e.to_string())
            }
        }
    }
}

async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let is_http = event.payload.get("body").is_some();
    let response = match request_payload(event.payload) {
        Ok(payload) => simulate(payload),
        Err(message) => error_response(message),
    };

    let body = serde_json::to_value(&response)?;
    if !is_http {
        return Ok(body);
    }

    let status = if response.error.is_some() { 400 } else { 200 };
    Ok(json!({
        "statusCode": status,
        "headers": { "Content-Type": "application/json" },
        "body": body.to_string(),
        "isBase64Encoded": false,
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
