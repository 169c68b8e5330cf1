//! Projection engine: year loop, IRR and output records

mod cashflows;
mod engine;
pub mod irr;
mod state;

pub use cashflows::{HorizonIrr, SimulationResult, SimulationSummary, YearlyResult};
pub use engine::{simulate, ProjectionConfig, ProjectionEngine};
pub use irr::{irr, npv, solve_irr};
pub use state::ProjectionState;
