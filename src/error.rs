//! Error types for simulation input handling

use thiserror::Error;

/// Errors raised before a projection is built
///
/// A run either returns a complete result or fails with one of these before
/// any output exists. IRR non-convergence is not an error.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("missing required input: {field}")]
    MissingInput { field: &'static str },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown {kind} tag: {value:?}")]
    UnknownTag { kind: &'static str, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SimulationError {
    pub fn unknown_tag(kind: &'static str, value: impl Into<String>) -> Self {
        SimulationError::UnknownTag {
            kind,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
