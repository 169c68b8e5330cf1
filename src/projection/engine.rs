//! Year-by-year projection of a rental investment and its summary indicators

use std::env;

use chrono::Datelike;
use log::{debug, info, warn};
use rayon::prelude::*;

use super::cashflows::{HorizonIrr, SimulationResult, YearlyResult};
use super::irr::irr;
use super::state::ProjectionState;
use crate::error::Result;
use crate::financing::{AmortizationSchedule, LoanCost};
use crate::fiscal::{
    capital_gains_tax, CapitalGainsTax, DepreciationPlan, IncentiveSchedule, TaxRegime, TaxableYear,
};
use crate::investment::InvestmentParameters;

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Seller-side costs on resale, percent of the sale price
    pub disposal_cost_pct: f64,

    /// Holding horizons (years) the IRR is reported for
    pub irr_horizons: Vec<u32>,

    /// First Newton seed of the IRR solver (fraction)
    pub irr_guess: f64,

    /// Solve the IRR horizons on the rayon pool
    pub parallel_irr: bool,

    /// Calendar year of projection year 1. None means the current year.
    pub start_year: Option<i32>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            disposal_cost_pct: 8.0,
            irr_horizons: vec![10, 20, 30],
            irr_guess: 0.1,
            parallel_irr: true,
            start_year: None,
        }
    }
}

impl ProjectionConfig {
    /// Defaults overridden by DISPOSAL_COST_PCT, IRR_GUESS, START_YEAR and
    /// PARALLEL_IRR when set and parseable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let disposal_cost_pct: f64 = env::var("DISPOSAL_COST_PCT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.disposal_cost_pct);

        let irr_guess: f64 = env::var("IRR_GUESS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.irr_guess);

        let start_year: Option<i32> = env::var("START_YEAR")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(defaults.start_year);

        let parallel_irr: bool = env::var("PARALLEL_IRR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.parallel_irr);

        Self {
            disposal_cost_pct,
            irr_guess,
            start_year,
            parallel_irr,
            ..defaults
        }
    }

    pub fn first_calendar_year(&self) -> i32 {
        self.start_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

/// Net proceeds of selling at the end of a given projected year
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Resale {
    price: f64,
    tax: CapitalGainsTax,
    net_proceeds: f64,
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run a full simulation for one investment
    pub fn simulate(&self, params: &InvestmentParameters) -> Result<SimulationResult> {
        params.check_required()?;

        let regime = params.tax_regime();
        let start_year = self.config.first_calendar_year();
        info!(
            "Projecting {} years from {} under {}",
            params.horizon_years,
            start_year,
            regime.label()
        );

        let schedule = AmortizationSchedule::new(
            params.loan_amount,
            params.loan_rate_pct,
            params.loan_term_years,
        );
        let depreciation = if regime.uses_depreciation() {
            DepreciationPlan::new(
                params.price,
                params.furniture_value(),
                params.renovation_works,
            )
        } else {
            DepreciationPlan::none()
        };
        let incentive = params
            .fiscal
            .incentive
            .map(|program| program.schedule(params.price, params.renovation_works, start_year));

        let years = self.project_years(
            params,
            regime,
            start_year,
            &schedule,
            &depreciation,
            incentive.as_ref(),
        );

        Ok(self.summarize(params, regime, &schedule, incentive.as_ref(), years))
    }

    /// The sequential fold over projection years
    fn project_years(
        &self,
        params: &InvestmentParameters,
        regime: TaxRegime,
        start_year: i32,
        schedule: &AmortizationSchedule,
        depreciation: &DepreciationPlan,
        incentive: Option<&IncentiveSchedule>,
    ) -> Vec<YearlyResult> {
        let mut state = ProjectionState::new();
        let mut years = Vec::with_capacity(params.horizon_years as usize);
        let marginal_rate = params.fiscal.marginal_rate_pct;
        let baseline_rent = params.baseline_effective_rent();

        while state.year <= params.horizon_years {
            let year = state.year;
            let calendar_year = start_year + year as i32 - 1;
            let elapsed = (year - 1) as i32;

            // Financing
            let loan = schedule.year_summary(year);
            let loan_insurance = if params.has_loan() && year <= params.loan_term_years {
                params.annual_loan_insurance()
            } else {
                0.0
            };

            // Rent
            let rent_index = (1.0 + params.rent_inflation_pct / 100.0).powi(elapsed);
            let status = params.energy_class.rental_status(calendar_year);
            let indexed_rent = baseline_rent * rent_index;
            let effective_rent = if !status.rentable {
                0.0
            } else if status.rent_frozen {
                indexed_rent.min(baseline_rent)
            } else {
                indexed_rent
            };
            if !status.rentable && years.last().map_or(true, |prev: &YearlyResult| prev.rentable) {
                warn!(
                    "Energy class {:?} cannot be let from {}, rent set to zero",
                    params.energy_class, calendar_year
                );
            }

            // Charges and tax
            let charges = params.annual_charges()
                * (1.0 + params.charges_inflation_pct / 100.0).powi(elapsed);
            let new_amortization = depreciation.annual_allowance(year);
            let tax = regime.compute(
                &TaxableYear {
                    rent: effective_rent,
                    deductible_expense: charges + loan.interest,
                    new_amortization,
                    carry_forward_in: state.carry_forward,
                },
                marginal_rate,
            );
            let incentive_reduction = incentive.map_or(0.0, |s| s.reduction_for_year(calendar_year));
            let incentive_reduction_used = incentive_reduction.min(tax.income_tax);
            let income_tax = tax.income_tax - incentive_reduction_used;
            let total_tax = income_tax + tax.social_levy;

            // Cash
            let cash_flow_before_tax =
                effective_rent - charges - loan.interest - loan.principal - loan_insurance;
            let cash_flow_after_tax = cash_flow_before_tax - total_tax;
            let amortization_available = if regime.uses_depreciation() {
                state.carry_forward + new_amortization
            } else {
                0.0
            };

            state.advance(tax.carry_forward_out, cash_flow_after_tax);

            let row = YearlyResult {
                year,
                calendar_year,
                gross_rent: params.annual_rent() * rent_index,
                effective_rent,
                rentable: status.rentable,
                rent_frozen: status.rent_frozen,
                charges,
                interest: loan.interest,
                principal: loan.principal,
                loan_insurance,
                remaining_balance: loan.balance,
                amortization_available,
                amortization_used: tax.amortization_used,
                amortization_carry_forward: tax.carry_forward_out,
                taxable_income: tax.taxable_income,
                income_tax,
                social_levy: tax.social_levy,
                incentive_reduction,
                incentive_reduction_used,
                total_tax,
                cash_flow_before_tax,
                cash_flow_after_tax,
                cumulative_cash_flow: state.cumulative_cash_flow,
                property_value: params.acquisition_cost()
                    * (1.0 + params.appreciation_pct / 100.0).powi(elapsed),
            };
            debug!(
                "Year {} ({}): rent {:.2}, tax {:.2}, cash flow {:.2}, carry-forward {:.2}",
                row.year,
                row.calendar_year,
                row.effective_rent,
                row.total_tax,
                row.cash_flow_after_tax,
                row.amortization_carry_forward
            );
            years.push(row);
        }

        years
    }

    /// Sale at the end of `row`'s year
    fn resale(&self, params: &InvestmentParameters, row: &YearlyResult) -> Resale {
        let price = row.property_value;
        let tax = capital_gains_tax(
            price,
            params.price,
            params.acquisition_cost() - params.price,
            row.year,
        );
        let disposal_costs = price * self.config.disposal_cost_pct / 100.0;
        let net_proceeds = (price - tax.total_tax - row.remaining_balance - disposal_costs).max(0.0);

        Resale {
            price,
            tax,
            net_proceeds,
        }
    }

    /// IRR of holding `horizon` years then selling, capped at the projected years
    fn horizon_irr(
        &self,
        params: &InvestmentParameters,
        years: &[YearlyResult],
        horizon: u32,
    ) -> HorizonIrr {
        let used = (horizon as usize).min(years.len());
        if used == 0 {
            return HorizonIrr {
                years: horizon,
                years_used: 0,
                irr_pct: 0.0,
            };
        }

        let mut flows = Vec::with_capacity(used + 1);
        flows.push(-params.initial_outlay());
        flows.extend(years[..used].iter().map(|y| y.cash_flow_after_tax));
        flows[used] += self.resale(params, &years[used - 1]).net_proceeds;

        let irr_pct = irr(&flows, self.config.irr_guess);
        if irr_pct == 0.0 {
            warn!("No meaningful IRR over {} years", used);
        }

        HorizonIrr {
            years: horizon,
            years_used: used as u32,
            irr_pct,
        }
    }

    fn summarize(
        &self,
        params: &InvestmentParameters,
        regime: TaxRegime,
        schedule: &AmortizationSchedule,
        incentive: Option<&IncentiveSchedule>,
        years: Vec<YearlyResult>,
    ) -> SimulationResult {
        let acquisition_cost = params.acquisition_cost();
        let initial_outlay = params.initial_outlay();
        let first = years.first().cloned().unwrap_or_default();
        let last = years.last().cloned().unwrap_or_default();

        let yield_pct = |amount: f64| {
            if acquisition_cost > 0.0 {
                amount / acquisition_cost * 100.0
            } else {
                0.0
            }
        };
        let gross_yield = yield_pct(params.annual_rent());
        let net_yield = yield_pct(first.effective_rent - first.charges);
        let net_net_yield = yield_pct(first.effective_rent - first.charges - first.total_tax);

        let irr: Vec<HorizonIrr> = if self.config.parallel_irr {
            self.config
                .irr_horizons
                .par_iter()
                .map(|&h| self.horizon_irr(params, &years, h))
                .collect()
        } else {
            self.config
                .irr_horizons
                .iter()
                .map(|&h| self.horizon_irr(params, &years, h))
                .collect()
        };

        let resale = self.resale(params, &last);
        let total_cash_invested = initial_outlay
            + years
                .iter()
                .filter(|y| y.cash_flow_after_tax < 0.0)
                .map(|y| -y.cash_flow_after_tax)
                .sum::<f64>();
        let total_profit = last.cumulative_cash_flow + resale.net_proceeds - initial_outlay;
        let roi = if total_cash_invested > 0.0 {
            total_profit / total_cash_invested * 100.0
        } else {
            0.0
        };
        let payback_year = years
            .iter()
            .find(|y| y.cumulative_cash_flow >= 0.0)
            .map(|y| y.year);

        SimulationResult {
            regime,
            acquisition_cost,
            initial_outlay,
            monthly_payment: schedule.monthly_payment,
            loan_cost: LoanCost::compute(
                params.loan_amount,
                params.loan_rate_pct,
                params.loan_term_years,
                params.borrower_insurance_pct,
            ),
            gross_yield,
            net_yield,
            net_net_yield,
            monthly_cash_flow: first.cash_flow_after_tax / 12.0,
            annual_cash_flow: first.cash_flow_after_tax,
            irr,
            roi,
            total_cash_invested,
            total_profit,
            payback_year,
            total_tax_paid: years.iter().map(|y| y.total_tax).sum(),
            total_incentive_reduction: years.iter().map(|y| y.incentive_reduction).sum(),
            total_incentive_reduction_used: years.iter().map(|y| y.incentive_reduction_used).sum(),
            incentive: incentive.map(IncentiveSchedule::reduction),
            resale_price: resale.price,
            gross_capital_gain: resale.tax.gross_gain,
            capital_gains_tax: resale.tax.total_tax,
            net_capital_gain: resale.tax.gross_gain - resale.tax.total_tax,
            net_resale_proceeds: resale.net_proceeds,
            years,
        }
    }
}

/// Simulate with the default configuration
pub fn simulate(params: &InvestmentParameters) -> Result<SimulationResult> {
    ProjectionEngine::default().simulate(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use crate::fiscal::{Commitment, EnergyClass, IncentiveProgram};
    use crate::investment::fixtures::reference_investment;
    use crate::investment::{LandlordStatus, Letting, PropertyKind};
    use approx::assert_relative_eq;

    fn engine() -> ProjectionEngine {
        ProjectionEngine::new(ProjectionConfig {
            start_year: Some(2025),
            ..Default::default()
        })
    }

    #[test]
    fn test_config_defaults() {
        let config = ProjectionConfig::default();
        assert_eq!(config.irr_horizons, vec![10, 20, 30]);
        assert_relative_eq!(config.disposal_cost_pct, 8.0, epsilon = 1e-9);
        assert_relative_eq!(config.irr_guess, 0.1, epsilon = 1e-9);
        assert!(config.parallel_irr);
        assert_eq!(engine().config().first_calendar_year(), 2025);
    }

    #[test]
    fn test_reference_scenario() {
        let result = engine().simulate(&reference_investment()).unwrap();

        assert_eq!(result.years.len(), 20);
        assert_relative_eq!(result.gross_yield, 4.444_444_444, epsilon = 1e-6);
        assert_relative_eq!(result.net_yield, 4.088_888_889, epsilon = 1e-6);
        assert_relative_eq!(result.years[0].interest, 6_061.370_448, epsilon = 1e-3);
        assert_relative_eq!(result.years[0].cash_flow_after_tax, -4_724.486_392, epsilon = 1e-3);

        // cumulative cash flow never turns positive while the loan runs
        assert_eq!(result.payback_year, None);
        assert_relative_eq!(result.irr_at(10).unwrap(), -1.757_808_2, max_relative = 1e-3);
        assert_relative_eq!(result.irr_at(20).unwrap(), 1.010_082_4, max_relative = 1e-3);
    }

    #[test]
    fn test_reference_totals() {
        let result = engine().simulate(&reference_investment()).unwrap();

        assert_relative_eq!(result.total_tax_paid, 50_817.887_139, epsilon = 1e-3);
        assert_relative_eq!(result.net_resale_proceeds, 198_720.0, epsilon = 1e-3);
        assert_relative_eq!(result.total_cash_invested, 175_152.872_015, epsilon = 1e-3);
        assert_relative_eq!(result.roi, 13.455_176, epsilon = 1e-4);
        assert_eq!(result.capital_gains_tax, 0.0);

        // 30-year IRR falls back to the 20 projected years
        let thirty = result.irr.iter().find(|h| h.years == 30).unwrap();
        assert_eq!(thirty.years_used, 20);
        assert_relative_eq!(thirty.irr_pct, result.irr_at(20).unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn test_missing_rent_fails_before_projection() {
        let mut params = reference_investment();
        params.monthly_rent = 0.0;
        let err = engine().simulate(&params).unwrap_err();
        assert!(matches!(err, SimulationError::MissingInput { field: "monthly_rent" }));
    }

    #[test]
    fn test_energy_ban_and_freeze() {
        let mut params = reference_investment();
        params.energy_class = EnergyClass::G;
        params.horizon_years = 3;
        params.rent_inflation_pct = 2.0;

        let config = ProjectionConfig {
            start_year: Some(2024),
            ..Default::default()
        };
        let result = ProjectionEngine::new(config).simulate(&params).unwrap();

        // 2024: frozen at the un-indexed baseline, 2025 onwards: banned
        assert!(result.years[0].rentable && result.years[0].rent_frozen);
        assert_relative_eq!(result.years[0].effective_rent, 8_832.0, epsilon = 1e-9);
        assert!(!result.years[1].rentable);
        assert_eq!(result.years[1].effective_rent, 0.0);
        assert_eq!(result.years[2].effective_rent, 0.0);

        params.energy_class = EnergyClass::F;
        let result = engine().simulate(&params).unwrap();
        for year in &result.years {
            assert!(year.rent_frozen);
            assert_relative_eq!(year.effective_rent, 8_832.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_furnished_carry_forward_is_conserved() {
        let mut params = reference_investment();
        params.fiscal.letting = Letting::Furnished;
        params.fiscal.landlord = LandlordStatus::Professional;
        params.renovation_works = 20_000.0;
        params.down_payment = 60_000.0;

        let result = engine().simulate(&params).unwrap();
        let mut carry_in = 0.0;
        for year in &result.years {
            assert!(year.taxable_income >= 0.0);
            assert_relative_eq!(
                year.amortization_used + year.amortization_carry_forward,
                year.amortization_available,
                epsilon = 1e-6
            );
            assert!(year.amortization_available >= carry_in - 1e-6);
            carry_in = year.amortization_carry_forward;
        }
        // depreciation larger than the rental result: nothing taxable early on
        assert_eq!(result.years[0].income_tax, 0.0);
        assert!(result.years[0].amortization_carry_forward > 0.0);
    }

    #[test]
    fn test_incentive_reduction_window() {
        let mut params = reference_investment();
        params.property_kind = PropertyKind::New;
        params.fiscal.incentive = Some(IncentiveProgram::Pinel {
            commitment: Commitment::Nine,
            investment_year: None,
        });

        let result = engine().simulate(&params).unwrap();
        // 200 000 x 12 % over 9 years
        assert_relative_eq!(result.years[0].incentive_reduction, 24_000.0 / 9.0, epsilon = 1e-9);
        assert_eq!(result.years[0].income_tax, 0.0);
        assert!(result.years[0].social_levy > 0.0);
        assert_eq!(result.years[9].incentive_reduction, 0.0);
        assert_relative_eq!(result.total_incentive_reduction, 24_000.0, epsilon = 1e-6);
        assert_eq!(result.incentive.unwrap().duration_years, 9);

        // only the income tax actually due is offset
        let first = &result.years[0];
        assert_relative_eq!(first.incentive_reduction_used, first.taxable_income * 0.30, epsilon = 1e-6);
        assert!(first.incentive_reduction_used < first.incentive_reduction);
        assert!(result.total_incentive_reduction_used < result.total_incentive_reduction);
        assert_eq!(result.years[9].incentive_reduction_used, 0.0);
    }

    #[test]
    fn test_resale_with_appreciation_is_taxed() {
        let mut params = reference_investment();
        params.appreciation_pct = 3.0;
        params.horizon_years = 10;

        let result = engine().simulate(&params).unwrap();
        let last = result.years.last().unwrap();

        // value compounds from year 2: 216 000 x 1.03^9
        let value = 216_000.0 * 1.03_f64.powi(9);
        let gain = value - 216_000.0;
        assert_relative_eq!(result.resale_price, 281_831.007_707, epsilon = 1e-3);
        assert_relative_eq!(result.gross_capital_gain, gain, epsilon = 1e-6);

        // 10 years held: 30 % income-tax allowance, 8.25 % social-levy allowance
        let expected_tax = gain * 0.70 * 0.19 + gain * 0.9175 * 0.172;
        assert_relative_eq!(result.capital_gains_tax, expected_tax, epsilon = 1e-6);
        assert_relative_eq!(result.capital_gains_tax, 19_144.315_351, epsilon = 1e-3);
        assert_relative_eq!(result.net_capital_gain, gain - expected_tax, epsilon = 1e-6);

        let expected_net = value - expected_tax - last.remaining_balance - value * 0.08;
        assert_relative_eq!(result.net_resale_proceeds, expected_net, epsilon = 1e-6);
        assert_relative_eq!(result.net_resale_proceeds, 136_917.260_892, epsilon = 1e-2);

        // the IRR prices the taxed resale in the last flow
        let irr10 = result.irr_at(10).unwrap();
        assert_relative_eq!(irr10, 3.192_669_7, max_relative = 1e-3);
        let mut flows = vec![-result.initial_outlay];
        flows.extend(result.years.iter().map(|y| y.cash_flow_after_tax));
        flows[10] += result.net_resale_proceeds;
        assert!(crate::projection::npv(&flows, irr10 / 100.0).abs() < 1e-2);

        let profit = last.cumulative_cash_flow + expected_net - result.initial_outlay;
        assert_relative_eq!(result.roi, profit / result.total_cash_invested * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_low_leverage_pays_back_after_the_loan() {
        let mut params = reference_investment();
        params.down_payment = 186_000.0;
        params.loan_amount = 30_000.0;
        params.loan_term_years = 5;
        params.horizon_years = 10;

        let result = engine().simulate(&params).unwrap();

        // negative while the loan runs, positive from year 6
        assert!(result.years[4].cash_flow_after_tax < 0.0);
        assert!(result.years[5].cash_flow_after_tax > 0.0);
        assert_relative_eq!(result.years[5].cumulative_cash_flow, -3_469.66, epsilon = 1e-2);
        assert_relative_eq!(result.years[6].cumulative_cash_flow, 1_193.64, epsilon = 1e-2);
        assert_eq!(result.payback_year, Some(7));
    }

    #[test]
    fn test_cash_purchase_pays_back_in_first_year() {
        let mut params = reference_investment();
        params.down_payment = 216_000.0;
        params.loan_amount = 0.0;

        let result = engine().simulate(&params).unwrap();
        assert_eq!(result.monthly_payment, 0.0);
        assert_eq!(result.loan_cost.total_cost, 0.0);
        assert_eq!(result.payback_year, Some(1));
    }

    #[test]
    fn test_config_from_env_overrides_and_falls_back() {
        env::set_var("DISPOSAL_COST_PCT", "6.5");
        env::set_var("START_YEAR", "2030");
        let config = ProjectionConfig::from_env();
        assert_relative_eq!(config.disposal_cost_pct, 6.5, epsilon = 1e-9);
        assert_eq!(config.start_year, Some(2030));
        assert_eq!(config.first_calendar_year(), 2030);

        env::set_var("DISPOSAL_COST_PCT", "eight");
        env::set_var("START_YEAR", "soon");
        let config = ProjectionConfig::from_env();
        assert_relative_eq!(config.disposal_cost_pct, 8.0, epsilon = 1e-9);
        assert_eq!(config.start_year, None);

        env::remove_var("DISPOSAL_COST_PCT");
        env::remove_var("START_YEAR");
        let config = ProjectionConfig::from_env();
        assert_relative_eq!(config.disposal_cost_pct, 8.0, epsilon = 1e-9);
        assert_eq!(config.start_year, None);
        assert_eq!(config.irr_horizons, vec![10, 20, 30]);
    }

    #[test]
    fn test_loan_insurance_stops_with_the_loan() {
        let mut params = reference_investment();
        params.loan_term_years = 10;
        params.borrower_insurance_pct = 0.3;
        params.horizon_years = 12;

        let result = engine().simulate(&params).unwrap();
        assert_relative_eq!(result.years[9].loan_insurance, 528.0, epsilon = 1e-9);
        assert_eq!(result.years[10].loan_insurance, 0.0);
        assert_eq!(result.years[10].interest, 0.0);
        assert_relative_eq!(result.years[10].remaining_balance, 0.0, epsilon = 1e-6);
        assert!(result.years[10].cash_flow_before_tax > 0.0);
    }

    #[test]
    fn test_parallel_and_sequential_irr_agree() {
        let params = reference_investment();
        let parallel = engine().simulate(&params).unwrap();
        let sequential = ProjectionEngine::new(ProjectionConfig {
            parallel_irr: false,
            start_year: Some(2025),
            ..Default::default()
        })
        .simulate(&params)
        .unwrap();

        assert_eq!(parallel.irr, sequential.irr);
    }
}
