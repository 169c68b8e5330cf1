//! Loan amortization and cost of credit

pub mod amortization;
mod loan_cost;

pub use amortization::{monthly_payment, AmortizationRow, AmortizationSchedule, YearSummary};
pub use loan_cost::LoanCost;
