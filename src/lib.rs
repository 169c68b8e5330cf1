//! Rental Projection - projection engine for rental real-estate investments
//!
//! This library provides:
//! - Loan amortization schedules and total cost of credit
//! - Year-by-year taxation under the micro, actual-expense and furnished regimes
//! - Tax-reduction programs, resale capital-gains tax and depreciation
//! - IRR, yields, ROI and payback indicators
//! - Parallel batch simulation over scenario sheets

pub mod error;
pub mod financing;
pub mod fiscal;
pub mod investment;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{Result, SimulationError};
pub use fiscal::{check_eligibility, EligibilityIssue, TaxRegime};
pub use investment::{load_parameters, load_scenarios, InvestmentParameters, Scenario};
pub use projection::{
    simulate, ProjectionConfig, ProjectionEngine, SimulationResult, SimulationSummary, YearlyResult,
};
pub use scenario::ScenarioRunner;
