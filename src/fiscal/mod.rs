//! French rental taxation: regimes, tax-reduction programs, resale gains,
//! depreciation and the regulatory predicates that gate letting

pub mod capital_gains;
pub mod depreciation;
pub mod eligibility;
pub mod energy;
pub mod incentive;
pub mod regime;

pub use capital_gains::{capital_gains_tax, holding_allowance, CapitalGainsTax, HoldingAllowance};
pub use depreciation::{DepreciableComponent, DepreciationPlan};
pub use eligibility::{check_eligibility, EligibilityIssue};
pub use energy::{EnergyClass, RentalStatus};
pub use incentive::{
    Commitment, HeritageZone, IncentiveKind, IncentiveProgram, IncentiveReduction,
    IncentiveSchedule,
};
pub use regime::{TaxOutcome, TaxRegime, TaxableYear, SOCIAL_LEVY_PCT};
