//! Investment parameters matching the simulation input record

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::fiscal::{EnergyClass, IncentiveProgram, TaxRegime};

/// Share of the purchase price assumed to be furniture when none is given
const DEFAULT_FURNITURE_SHARE: f64 = 0.05;

/// Notary fees on a new build (% of price)
pub const NOTARY_FEES_NEW_PCT: f64 = 2.5;
/// Notary fees on an existing property (% of price)
pub const NOTARY_FEES_EXISTING_PCT: f64 = 8.0;

/// New build or existing property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    New,
    Existing,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::New => "new",
            PropertyKind::Existing => "existing",
        }
    }
}

/// Rough notary and transfer-tax fees for a purchase
pub fn estimate_notary_fees(price: f64, kind: PropertyKind) -> f64 {
    let pct = match kind {
        PropertyKind::New => NOTARY_FEES_NEW_PCT,
        PropertyKind::Existing => NOTARY_FEES_EXISTING_PCT,
    };
    price * pct / 100.0
}

impl FromStr for PropertyKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" | "neuf" => Ok(PropertyKind::New),
            "existing" | "ancien" => Ok(PropertyKind::Existing),
            _ => Err(SimulationError::unknown_tag("property kind", s)),
        }
    }
}

/// Whether the unit is let bare or furnished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Letting {
    Unfurnished,
    Furnished,
}

impl FromStr for Letting {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unfurnished" | "nue" => Ok(Letting::Unfurnished),
            "furnished" | "meublee" => Ok(Letting::Furnished),
            _ => Err(SimulationError::unknown_tag("letting", s)),
        }
    }
}

/// Flat-allowance (micro) or actual-expense taxation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxScheme {
    Micro,
    Actual,
}

impl FromStr for TaxScheme {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "micro" => Ok(TaxScheme::Micro),
            "actual" | "reel" => Ok(TaxScheme::Actual),
            _ => Err(SimulationError::unknown_tag("tax scheme", s)),
        }
    }
}

/// Furnished landlord status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LandlordStatus {
    /// Non-professional furnished landlord (LMNP)
    #[default]
    #[serde(rename = "lmnp")]
    NonProfessional,
    /// Professional furnished landlord (LMP)
    #[serde(rename = "lmp")]
    Professional,
}

impl FromStr for LandlordStatus {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lmnp" | "non-professional" => Ok(LandlordStatus::NonProfessional),
            "lmp" | "professional" => Ok(LandlordStatus::Professional),
            _ => Err(SimulationError::unknown_tag("landlord status", s)),
        }
    }
}

/// Furnished letting category, drives the micro-BIC allowance and ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FurnishedKind {
    /// Long-term furnished letting
    #[default]
    Standard,
    /// Short-term rental with a tourism classification
    ClassifiedTourism,
    /// Short-term rental without classification
    UnclassifiedTourism,
}

impl FromStr for FurnishedKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "standard" => Ok(FurnishedKind::Standard),
            "classified-tourism" => Ok(FurnishedKind::ClassifiedTourism),
            "unclassified-tourism" => Ok(FurnishedKind::UnclassifiedTourism),
            _ => Err(SimulationError::unknown_tag("furnished kind", s)),
        }
    }
}

/// Fiscal election made by the investor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalElection {
    pub letting: Letting,

    pub scheme: TaxScheme,

    #[serde(default)]
    pub landlord: LandlordStatus,

    #[serde(default)]
    pub furnished_kind: FurnishedKind,

    /// Tax-reduction program, if any. Takes precedence over the letting/scheme pair.
    #[serde(default)]
    pub incentive: Option<IncentiveProgram>,

    /// Marginal income-tax rate (%)
    pub marginal_rate_pct: f64,
}

impl FiscalElection {
    /// Resolve the election to the single regime the tax engine dispatches on
    pub fn regime(&self) -> TaxRegime {
        TaxRegime::from_election(self)
    }
}

/// A single investment to project
///
/// Rates and percentages are expressed in percent (`3.5` = 3.5 %).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentParameters {
    // Acquisition
    /// Purchase price
    pub price: f64,

    /// Notary / transfer-tax fees
    #[serde(default)]
    pub notary_fees: f64,

    #[serde(default)]
    pub agency_fees: f64,

    /// Renovation budget
    #[serde(default)]
    pub renovation_works: f64,

    /// Cash brought by the investor
    #[serde(default)]
    pub down_payment: f64,

    // Financing
    #[serde(default)]
    pub loan_amount: f64,

    #[serde(default)]
    pub loan_term_years: u32,

    /// Nominal annual loan rate (%)
    #[serde(default)]
    pub loan_rate_pct: f64,

    /// Borrower insurance, annual percent of the borrowed amount
    #[serde(default)]
    pub borrower_insurance_pct: f64,

    // Property
    #[serde(default)]
    pub surface_m2: f64,

    pub property_kind: PropertyKind,

    #[serde(default)]
    pub energy_class: EnergyClass,

    /// Furniture value for the furnished depreciation plan (defaults to 5 % of price)
    #[serde(default)]
    pub furniture_value: Option<f64>,

    // Rental
    /// Monthly rent excluding recoverable charges
    pub monthly_rent: f64,

    /// Charges passed through to the tenant
    #[serde(default)]
    pub recoverable_charges_monthly: f64,

    /// Expected vacancy (%)
    #[serde(default)]
    pub vacancy_rate_pct: f64,

    // Fixed annual charges
    #[serde(default)]
    pub condo_fees: f64,

    #[serde(default)]
    pub maintenance: f64,

    #[serde(default)]
    pub insurance: f64,

    #[serde(default)]
    pub property_tax: f64,

    // Fiscal
    pub fiscal: FiscalElection,

    // Projection
    pub horizon_years: u32,

    #[serde(default)]
    pub rent_inflation_pct: f64,

    #[serde(default)]
    pub charges_inflation_pct: f64,

    /// Annual property appreciation (%), may be negative
    #[serde(default)]
    pub appreciation_pct: f64,
}

impl InvestmentParameters {
    /// Minimal precondition check performed by the engine itself
    ///
    /// Finer validation belongs to the caller, see [`crate::fiscal::check_eligibility`].
    pub fn check_required(&self) -> Result<()> {
        if self.price <= 0.0 {
            return Err(SimulationError::MissingInput { field: "price" });
        }
        if self.monthly_rent <= 0.0 {
            return Err(SimulationError::MissingInput { field: "monthly_rent" });
        }
        if self.horizon_years == 0 {
            return Err(SimulationError::InvalidInput(
                "horizon_years must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Price plus fees and works
    pub fn acquisition_cost(&self) -> f64 {
        self.price + self.notary_fees + self.agency_fees + self.renovation_works
    }

    /// Everything paid on top of the price when buying
    pub fn acquisition_fees(&self) -> f64 {
        self.notary_fees + self.agency_fees
    }

    /// Cash out of pocket at day zero: down payment plus fees
    pub fn initial_outlay(&self) -> f64 {
        self.down_payment + self.acquisition_fees()
    }

    /// Annual rent before vacancy
    pub fn annual_rent(&self) -> f64 {
        self.monthly_rent * 12.0
    }

    /// Annual rent after vacancy, before indexation
    pub fn baseline_effective_rent(&self) -> f64 {
        self.annual_rent() * (1.0 - self.vacancy_rate_pct / 100.0)
    }

    /// Year-1 non-recoverable charges
    pub fn annual_charges(&self) -> f64 {
        self.condo_fees + self.maintenance + self.insurance + self.property_tax
    }

    /// Annual borrower insurance premium while the loan runs
    pub fn annual_loan_insurance(&self) -> f64 {
        self.loan_amount * self.borrower_insurance_pct / 100.0
    }

    pub fn furniture_value(&self) -> f64 {
        self.furniture_value
            .unwrap_or(self.price * DEFAULT_FURNITURE_SHARE)
    }

    pub fn tax_regime(&self) -> TaxRegime {
        self.fiscal.regime()
    }

    pub fn has_loan(&self) -> bool {
        self.loan_amount > 0.0 && self.loan_term_years > 0
    }
}
