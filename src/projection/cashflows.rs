//! Output structures of a simulation run

use serde::{Deserialize, Serialize};

use crate::financing::LoanCost;
use crate::fiscal::{IncentiveReduction, TaxRegime};

/// One projected year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyResult {
    // Timing
    pub year: u32,
    pub calendar_year: i32,

    // Rent
    /// Contractual rent before vacancy
    pub gross_rent: f64,
    /// Rent after vacancy, indexation and energy-class constraints
    pub effective_rent: f64,
    pub rentable: bool,
    pub rent_frozen: bool,

    // Charges and financing
    /// Non-recoverable charges, excluding interest
    pub charges: f64,
    pub interest: f64,
    pub principal: f64,
    pub loan_insurance: f64,
    pub remaining_balance: f64,

    // Tax
    /// Carried-in plus newly generated depreciation
    pub amortization_available: f64,
    pub amortization_used: f64,
    pub amortization_carry_forward: f64,
    pub taxable_income: f64,
    /// Income tax after the incentive reduction
    pub income_tax: f64,
    pub social_levy: f64,
    /// Reduction scheduled for the calendar year
    pub incentive_reduction: f64,
    /// Part of the scheduled reduction that offset income tax
    pub incentive_reduction_used: f64,
    pub total_tax: f64,

    // Cash
    pub cash_flow_before_tax: f64,
    pub cash_flow_after_tax: f64,
    pub cumulative_cash_flow: f64,

    pub property_value: f64,
}

/// IRR for one holding horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonIrr {
    /// Requested horizon in years
    pub years: u32,
    /// Projected years actually used (capped by the run's horizon)
    pub years_used: u32,
    /// Percent; 0.0 means no meaningful IRR
    pub irr_pct: f64,
}

/// Complete simulation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub regime: TaxRegime,

    /// Yearly rows in year order
    pub years: Vec<YearlyResult>,

    // Acquisition
    pub acquisition_cost: f64,
    /// Down payment plus fees paid at day zero
    pub initial_outlay: f64,
    pub monthly_payment: f64,
    /// Interest and insurance over the full loan term
    pub loan_cost: LoanCost,

    // Yields (%) from year-1 figures
    pub gross_yield: f64,
    pub net_yield: f64,
    pub net_net_yield: f64,

    // Cash flow (year 1, after tax)
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,

    pub irr: Vec<HorizonIrr>,

    // Profitability
    pub roi: f64,
    /// Initial outlay plus every negative yearly cash flow
    pub total_cash_invested: f64,
    pub total_profit: f64,
    /// First year whose cumulative cash flow is non-negative
    pub payback_year: Option<u32>,

    // Tax totals
    pub total_tax_paid: f64,
    /// Sum of the scheduled reductions
    pub total_incentive_reduction: f64,
    /// Sum of the reductions that offset income tax
    pub total_incentive_reduction_used: f64,
    pub incentive: Option<IncentiveReduction>,

    // Resale at the end of the horizon
    pub resale_price: f64,
    pub gross_capital_gain: f64,
    pub capital_gains_tax: f64,
    pub net_capital_gain: f64,
    pub net_resale_proceeds: f64,
}

impl SimulationResult {
    /// IRR (%) for the given horizon, if it was computed
    pub fn irr_at(&self, years: u32) -> Option<f64> {
        self.irr.iter().find(|h| h.years == years).map(|h| h.irr_pct)
    }

    pub fn horizon_years(&self) -> u32 {
        self.years.len() as u32
    }

    pub fn final_year(&self) -> Option<&YearlyResult> {
        self.years.last()
    }

    /// Compact scalar view for batch reports
    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            regime: self.regime.label().to_string(),
            horizon_years: self.horizon_years(),
            gross_yield: self.gross_yield,
            net_net_yield: self.net_net_yield,
            monthly_cash_flow: self.monthly_cash_flow,
            irr_first_horizon: self.irr.first().map_or(0.0, |h| h.irr_pct),
            roi: self.roi,
            total_tax_paid: self.total_tax_paid,
            payback_year: self.payback_year,
            net_resale_proceeds: self.net_resale_proceeds,
            final_cumulative_cash_flow: self.final_year().map_or(0.0, |y| y.cumulative_cash_flow),
        }
    }
}

/// Summary statistics for a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub regime: String,
    pub horizon_years: u32,
    pub gross_yield: f64,
    pub net_net_yield: f64,
    pub monthly_cash_flow: f64,
    pub irr_first_horizon: f64,
    pub roi: f64,
    pub total_tax_paid: f64,
    pub payback_year: Option<u32>,
    pub net_resale_proceeds: f64,
    pub final_cumulative_cash_flow: f64,
}
