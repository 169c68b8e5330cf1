//! Tax engine: annual taxable income, income tax and social levy per regime

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::incentive::IncentiveKind;
use crate::error::{Result, SimulationError};
use crate::investment::{FiscalElection, FurnishedKind, LandlordStatus, Letting, TaxScheme};

/// Social levy on rental income (%)
pub const SOCIAL_LEVY_PCT: f64 = 17.2;

/// Flat allowance, unfurnished micro regime (%)
pub const MICRO_FONCIER_ALLOWANCE_PCT: f64 = 30.0;
/// Flat allowance, furnished micro regime (%)
pub const MICRO_BIC_ALLOWANCE_PCT: f64 = 50.0;
/// Flat allowance, classified furnished tourism rentals (%)
pub const MICRO_BIC_CLASSIFIED_ALLOWANCE_PCT: f64 = 71.0;
/// Flat allowance, unclassified furnished tourism rentals (%)
pub const MICRO_BIC_UNCLASSIFIED_ALLOWANCE_PCT: f64 = 30.0;

/// The closed set of tax regimes the engine knows how to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "regime", content = "variant", rename_all = "kebab-case")]
pub enum TaxRegime {
    /// Unfurnished, flat 30 % allowance
    MicroFoncier,
    /// Unfurnished, actual expenses
    ReelFoncier,
    /// Furnished, flat allowance depending on the rental kind
    MicroBic(FurnishedKind),
    /// Furnished, actual expenses with depreciation carry-forward
    ReelBic(LandlordStatus),
    /// Tax-reduction program on top of the unfurnished actual-expense base
    Incentive(IncentiveKind),
}

/// Inputs of one year of tax computation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaxableYear {
    pub rent: f64,
    pub deductible_expense: f64,
    /// Depreciation generated this year
    pub new_amortization: f64,
    /// Unused depreciation brought from prior years
    pub carry_forward_in: f64,
}

/// Result of one year of tax computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxOutcome {
    pub taxable_income: f64,
    pub income_tax: f64,
    pub social_levy: f64,
    pub total_tax: f64,
    pub amortization_used: f64,
    pub carry_forward_out: f64,
}

impl TaxOutcome {
    fn on_taxable_income(taxable_income: f64, marginal_rate_pct: f64) -> Self {
        let income_tax = taxable_income * marginal_rate_pct / 100.0;
        let social_levy = taxable_income * SOCIAL_LEVY_PCT / 100.0;
        Self {
            taxable_income,
            income_tax,
            social_levy,
            total_tax: income_tax + social_levy,
            amortization_used: 0.0,
            carry_forward_out: 0.0,
        }
    }
}

impl TaxRegime {
    /// Map a fiscal election to its regime. An incentive program wins over
    /// the letting/scheme pair.
    pub fn from_election(election: &FiscalElection) -> Self {
        if let Some(program) = &election.incentive {
            return TaxRegime::Incentive(program.kind());
        }
        match (election.letting, election.scheme) {
            (Letting::Unfurnished, TaxScheme::Micro) => TaxRegime::MicroFoncier,
            (Letting::Unfurnished, TaxScheme::Actual) => TaxRegime::ReelFoncier,
            (Letting::Furnished, TaxScheme::Micro) => TaxRegime::MicroBic(election.furnished_kind),
            (Letting::Furnished, TaxScheme::Actual) => TaxRegime::ReelBic(election.landlord),
        }
    }

    /// Letting and scheme implied by the regime
    pub fn letting_and_scheme(&self) -> (Letting, TaxScheme) {
        match self {
            TaxRegime::MicroFoncier => (Letting::Unfurnished, TaxScheme::Micro),
            TaxRegime::ReelFoncier | TaxRegime::Incentive(_) => {
                (Letting::Unfurnished, TaxScheme::Actual)
            }
            TaxRegime::MicroBic(_) => (Letting::Furnished, TaxScheme::Micro),
            TaxRegime::ReelBic(_) => (Letting::Furnished, TaxScheme::Actual),
        }
    }

    /// Flat allowance (%) for micro regimes
    pub fn flat_allowance_pct(&self) -> Option<f64> {
        match self {
            TaxRegime::MicroFoncier => Some(MICRO_FONCIER_ALLOWANCE_PCT),
            TaxRegime::MicroBic(FurnishedKind::Standard) => Some(MICRO_BIC_ALLOWANCE_PCT),
            TaxRegime::MicroBic(FurnishedKind::ClassifiedTourism) => {
                Some(MICRO_BIC_CLASSIFIED_ALLOWANCE_PCT)
            }
            TaxRegime::MicroBic(FurnishedKind::UnclassifiedTourism) => {
                Some(MICRO_BIC_UNCLASSIFIED_ALLOWANCE_PCT)
            }
            TaxRegime::ReelFoncier | TaxRegime::ReelBic(_) | TaxRegime::Incentive(_) => None,
        }
    }

    /// Whether the regime deducts depreciation and carries it forward
    pub fn uses_depreciation(&self) -> bool {
        matches!(self, TaxRegime::ReelBic(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaxRegime::MicroFoncier => "micro-foncier",
            TaxRegime::ReelFoncier => "reel-foncier",
            TaxRegime::MicroBic(_) => "micro-bic",
            TaxRegime::ReelBic(LandlordStatus::NonProfessional) => "lmnp-reel",
            TaxRegime::ReelBic(LandlordStatus::Professional) => "lmp-reel",
            TaxRegime::Incentive(kind) => kind.as_str(),
        }
    }

    /// Compute one year of tax for this regime
    ///
    /// Incentive reductions are not applied here, the orchestrator subtracts
    /// them from the income tax afterwards.
    pub fn compute(&self, year: &TaxableYear, marginal_rate_pct: f64) -> TaxOutcome {
        match self {
            TaxRegime::MicroFoncier | TaxRegime::MicroBic(_) => {
                let allowance = self.flat_allowance_pct().unwrap_or(0.0);
                let taxable = year.rent * (1.0 - allowance / 100.0);
                TaxOutcome::on_taxable_income(taxable, marginal_rate_pct)
            }
            TaxRegime::ReelFoncier | TaxRegime::Incentive(_) => {
                let taxable = (year.rent - year.deductible_expense).max(0.0);
                TaxOutcome::on_taxable_income(taxable, marginal_rate_pct)
            }
            TaxRegime::ReelBic(_) => compute_actual_furnished(year, marginal_rate_pct),
        }
    }
}

/// Furnished actual-expense: depreciation only shelters a positive result,
/// a deficit leaves all of it for later years.
fn compute_actual_furnished(year: &TaxableYear, marginal_rate_pct: f64) -> TaxOutcome {
    let available = year.carry_forward_in + year.new_amortization;
    let result_before_amortization = year.rent - year.deductible_expense;

    if result_before_amortization <= 0.0 {
        return TaxOutcome {
            taxable_income: 0.0,
            income_tax: 0.0,
            social_levy: 0.0,
            total_tax: 0.0,
            amortization_used: 0.0,
            carry_forward_out: available,
        };
    }

    let used = available.min(result_before_amortization);
    let taxable = (result_before_amortization - used).max(0.0);

    TaxOutcome {
        amortization_used: used,
        carry_forward_out: available - used,
        ..TaxOutcome::on_taxable_income(taxable, marginal_rate_pct)
    }
}

impl FromStr for TaxRegime {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase().replace('é', "e");
        match tag.as_str() {
            "micro-foncier" => Ok(TaxRegime::MicroFoncier),
            "reel-foncier" => Ok(TaxRegime::ReelFoncier),
            "micro-bic" => Ok(TaxRegime::MicroBic(FurnishedKind::Standard)),
            "micro-bic-classified" => Ok(TaxRegime::MicroBic(FurnishedKind::ClassifiedTourism)),
            "micro-bic-unclassified" => {
                Ok(TaxRegime::MicroBic(FurnishedKind::UnclassifiedTourism))
            }
            "reel-bic" | "lmnp-reel" => Ok(TaxRegime::ReelBic(LandlordStatus::NonProfessional)),
            "lmp-reel" => Ok(TaxRegime::ReelBic(LandlordStatus::Professional)),
            "pinel" => Ok(TaxRegime::Incentive(IncentiveKind::Pinel)),
            "denormandie" => Ok(TaxRegime::Incentive(IncentiveKind::Denormandie)),
            "malraux" => Ok(TaxRegime::Incentive(IncentiveKind::Malraux)),
            _ => Err(SimulationError::unknown_tag("regime", s)),
        }
    }
}
