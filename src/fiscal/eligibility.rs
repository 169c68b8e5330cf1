//! Eligibility rules a caller checks before asking for a projection
//!
//! The engine does not run these itself; it only checks that price and rent
//! are present.

use thiserror::Error;

use super::incentive::IncentiveKind;
use super::regime::TaxRegime;
use crate::investment::{FurnishedKind, InvestmentParameters, PropertyKind};

/// Annual rent ceiling for the unfurnished micro regime
pub const MICRO_FONCIER_CEILING: f64 = 15_000.0;
/// Annual receipts ceiling for the furnished micro regime
pub const MICRO_BIC_CEILING: f64 = 77_700.0;
/// Ceiling for classified tourism rentals
pub const MICRO_BIC_CLASSIFIED_CEILING: f64 = 188_700.0;
/// Ceiling for unclassified tourism rentals
pub const MICRO_BIC_UNCLASSIFIED_CEILING: f64 = 15_000.0;
/// Minimum renovation budget for the existing-property program
pub const DENORMANDIE_MIN_WORKS: f64 = 10_000.0;
/// Vacancy rates above this are considered unrealistic (%)
pub const MAX_VACANCY_PCT: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EligibilityIssue {
    #[error("annual rent {rent:.0} exceeds the {ceiling:.0} ceiling of the {regime} regime")]
    MicroCeilingExceeded {
        regime: &'static str,
        rent: f64,
        ceiling: f64,
    },

    #[error("{program} requires a {required} property")]
    PropertyKindMismatch {
        program: IncentiveKind,
        required: &'static str,
    },

    #[error("denormandie requires at least {minimum:.0} of renovation works, got {works:.0}")]
    InsufficientWorks { works: f64, minimum: f64 },

    #[error("down payment {down_payment:.0} exceeds acquisition cost {acquisition_cost:.0}")]
    DownPaymentTooLarge {
        down_payment: f64,
        acquisition_cost: f64,
    },

    #[error("a loan requires a positive rate and term")]
    IncompleteLoan,

    #[error("vacancy rate {0:.1}% is above the 20% limit")]
    VacancyTooHigh(f64),
}

/// Micro-regime ceiling on annual rent, if the regime has one
pub fn micro_ceiling(regime: &TaxRegime) -> Option<f64> {
    match regime {
        TaxRegime::MicroFoncier => Some(MICRO_FONCIER_CEILING),
        TaxRegime::MicroBic(FurnishedKind::Standard) => Some(MICRO_BIC_CEILING),
        TaxRegime::MicroBic(FurnishedKind::ClassifiedTourism) => Some(MICRO_BIC_CLASSIFIED_CEILING),
        TaxRegime::MicroBic(FurnishedKind::UnclassifiedTourism) => {
            Some(MICRO_BIC_UNCLASSIFIED_CEILING)
        }
        TaxRegime::ReelFoncier | TaxRegime::ReelBic(_) | TaxRegime::Incentive(_) => None,
    }
}

/// Property kind a program is restricted to
fn required_property_kind(kind: IncentiveKind) -> PropertyKind {
    match kind {
        IncentiveKind::Pinel => PropertyKind::New,
        IncentiveKind::Denormandie | IncentiveKind::Malraux => PropertyKind::Existing,
    }
}

/// Collect every eligibility problem of an investment; empty means eligible
pub fn check_eligibility(params: &InvestmentParameters) -> Vec<EligibilityIssue> {
    let mut issues = Vec::new();
    let regime = params.tax_regime();

    if let Some(ceiling) = micro_ceiling(&regime) {
        let rent = params.annual_rent();
        if rent > ceiling {
            issues.push(EligibilityIssue::MicroCeilingExceeded {
                regime: regime.label(),
                rent,
                ceiling,
            });
        }
    }

    if let TaxRegime::Incentive(kind) = regime {
        let required = required_property_kind(kind);
        if params.property_kind != required {
            issues.push(EligibilityIssue::PropertyKindMismatch {
                program: kind,
                required: required.as_str(),
            });
        }
        if kind == IncentiveKind::Denormandie && params.renovation_works < DENORMANDIE_MIN_WORKS {
            issues.push(EligibilityIssue::InsufficientWorks {
                works: params.renovation_works,
                minimum: DENORMANDIE_MIN_WORKS,
            });
        }
    }

    if params.down_payment > params.acquisition_cost() {
        issues.push(EligibilityIssue::DownPaymentTooLarge {
            down_payment: params.down_payment,
            acquisition_cost: params.acquisition_cost(),
        });
    }

    if params.loan_amount > 0.0 && (params.loan_rate_pct <= 0.0 || params.loan_term_years == 0) {
        issues.push(EligibilityIssue::IncompleteLoan);
    }

    if params.vacancy_rate_pct > MAX_VACANCY_PCT {
        issues.push(EligibilityIssue::VacancyTooHigh(params.vacancy_rate_pct));
    }

    issues
}
