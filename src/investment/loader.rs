//! Load investments from a JSON document or a flat CSV scenario sheet

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::Reader;
use log::{debug, info};
use serde::Deserialize;

use super::{
    estimate_notary_fees, FiscalElection, FurnishedKind, InvestmentParameters, LandlordStatus,
    PropertyKind,
};
use crate::error::Result;
use crate::fiscal::{Commitment, EnergyClass, HeritageZone, IncentiveKind, IncentiveProgram, TaxRegime};

/// Commitment assumed for price-linked programs when the sheet leaves it empty
const DEFAULT_COMMITMENT_YEARS: u32 = 9;

/// One named row of a scenario sheet
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub params: InvestmentParameters,
}

/// Raw CSV row, one scenario per line
///
/// Optional columns may be left empty or omitted entirely.
#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    price: f64,
    #[serde(default)]
    notary_fees: Option<f64>,
    #[serde(default)]
    agency_fees: Option<f64>,
    #[serde(default)]
    renovation_works: Option<f64>,
    #[serde(default)]
    down_payment: Option<f64>,
    #[serde(default)]
    loan_amount: Option<f64>,
    #[serde(default)]
    loan_term_years: Option<u32>,
    #[serde(default)]
    loan_rate_pct: Option<f64>,
    #[serde(default)]
    borrower_insurance_pct: Option<f64>,
    #[serde(default)]
    surface_m2: Option<f64>,
    property_kind: String,
    #[serde(default)]
    energy_class: Option<String>,
    #[serde(default)]
    furniture_value: Option<f64>,
    monthly_rent: f64,
    #[serde(default)]
    recoverable_charges_monthly: Option<f64>,
    #[serde(default)]
    vacancy_rate_pct: Option<f64>,
    #[serde(default)]
    condo_fees: Option<f64>,
    #[serde(default)]
    maintenance: Option<f64>,
    #[serde(default)]
    insurance: Option<f64>,
    #[serde(default)]
    property_tax: Option<f64>,
    regime: String,
    marginal_rate_pct: f64,
    #[serde(default)]
    commitment_years: Option<u32>,
    #[serde(default)]
    incentive_year: Option<i32>,
    #[serde(default)]
    heritage_works: Option<f64>,
    #[serde(default)]
    heritage_zone: Option<String>,
    horizon_years: u32,
    #[serde(default)]
    rent_inflation_pct: Option<f64>,
    #[serde(default)]
    charges_inflation_pct: Option<f64>,
    #[serde(default)]
    appreciation_pct: Option<f64>,
}

impl CsvRow {
    fn into_scenario(self) -> Result<Scenario> {
        let property_kind: PropertyKind = self.property_kind.parse()?;
        let energy_class: EnergyClass = match &self.energy_class {
            Some(tag) => tag.parse()?,
            None => EnergyClass::default(),
        };
        let regime: TaxRegime = self.regime.parse()?;
        let fiscal = self.election(regime)?;

        let notary_fees = self
            .notary_fees
            .unwrap_or_else(|| estimate_notary_fees(self.price, property_kind));
        let agency_fees = self.agency_fees.unwrap_or(0.0);
        let renovation_works = self.renovation_works.unwrap_or(0.0);
        let down_payment = self.down_payment.unwrap_or(0.0);
        let loan_amount = self.loan_amount.unwrap_or_else(|| {
            let cost = self.price + notary_fees + agency_fees + renovation_works;
            (cost - down_payment).max(0.0)
        });

        let params = InvestmentParameters {
            price: self.price,
            notary_fees,
            agency_fees,
            renovation_works,
            down_payment,
            loan_amount,
            loan_term_years: self.loan_term_years.unwrap_or(0),
            loan_rate_pct: self.loan_rate_pct.unwrap_or(0.0),
            borrower_insurance_pct: self.borrower_insurance_pct.unwrap_or(0.0),
            surface_m2: self.surface_m2.unwrap_or(0.0),
            property_kind,
            energy_class,
            furniture_value: self.furniture_value,
            monthly_rent: self.monthly_rent,
            recoverable_charges_monthly: self.recoverable_charges_monthly.unwrap_or(0.0),
            vacancy_rate_pct: self.vacancy_rate_pct.unwrap_or(0.0),
            condo_fees: self.condo_fees.unwrap_or(0.0),
            maintenance: self.maintenance.unwrap_or(0.0),
            insurance: self.insurance.unwrap_or(0.0),
            property_tax: self.property_tax.unwrap_or(0.0),
            fiscal,
            horizon_years: self.horizon_years,
            rent_inflation_pct: self.rent_inflation_pct.unwrap_or(0.0),
            charges_inflation_pct: self.charges_inflation_pct.unwrap_or(0.0),
            appreciation_pct: self.appreciation_pct.unwrap_or(0.0),
        };

        Ok(Scenario {
            name: self.name,
            params,
        })
    }

    /// Rebuild the investor's election from the single regime column
    fn election(&self, regime: TaxRegime) -> Result<FiscalElection> {
        let (letting, scheme) = regime.letting_and_scheme();
        let landlord = match regime {
            TaxRegime::ReelBic(status) => status,
            _ => LandlordStatus::default(),
        };
        let furnished_kind = match regime {
            TaxRegime::MicroBic(kind) => kind,
            _ => FurnishedKind::default(),
        };

        let incentive = match regime {
            TaxRegime::Incentive(IncentiveKind::Pinel) => Some(IncentiveProgram::Pinel {
                commitment: self.commitment()?,
                investment_year: self.incentive_year,
            }),
            TaxRegime::Incentive(IncentiveKind::Denormandie) => {
                Some(IncentiveProgram::Denormandie {
                    commitment: self.commitment()?,
                    investment_year: self.incentive_year,
                })
            }
            TaxRegime::Incentive(IncentiveKind::Malraux) => {
                let zone: HeritageZone = match &self.heritage_zone {
                    Some(tag) => tag.parse()?,
                    None => HeritageZone::Other,
                };
                Some(IncentiveProgram::Malraux {
                    works_amount: self
                        .heritage_works
                        .unwrap_or(self.renovation_works.unwrap_or(0.0)),
                    zone,
                    works_start_year: self.incentive_year,
                })
            }
            _ => None,
        };

        Ok(FiscalElection {
            letting,
            scheme,
            landlord,
            furnished_kind,
            incentive,
            marginal_rate_pct: self.marginal_rate_pct,
        })
    }

    fn commitment(&self) -> Result<Commitment> {
        Commitment::try_from(self.commitment_years.unwrap_or(DEFAULT_COMMITMENT_YEARS))
    }
}

/// Load a single investment from a JSON document
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<InvestmentParameters> {
    let file = File::open(path.as_ref())?;
    let params: InvestmentParameters = serde_json::from_reader(BufReader::new(file))?;
    debug!("Loaded investment from {}", path.as_ref().display());
    Ok(params)
}

/// Load all scenarios from a CSV sheet
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<Scenario>> {
    let scenarios = load_scenarios_from_reader(File::open(path.as_ref())?)?;
    info!(
        "Loaded {} scenarios from {}",
        scenarios.len(),
        path.as_ref().display()
    );
    Ok(scenarios)
}

/// Load scenarios from any reader (e.g., string buffer, request body)
pub fn load_scenarios_from_reader<R: Read>(reader: R) -> Result<Vec<Scenario>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut scenarios = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        scenarios.push(row.into_scenario()?);
    }

    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use crate::investment::{Letting, TaxScheme};

    const SHEET: &str = "\
name,price,down_payment,loan_term_years,loan_rate_pct,property_kind,energy_class,monthly_rent,vacancy_rate_pct,regime,marginal_rate_pct,commitment_years,horizon_years
reference,200000,40000,20,3.5,existing,D,800,8,reel-foncier,30,,20
furnished,150000,30000,25,3.8,ancien,,700,5,lmnp-reel,41,,25
pinel,250000,25000,20,3.6,new,A,900,5,pinel,30,12,15
";

    #[test]
    fn test_load_scenarios_applies_defaults() {
        let scenarios = load_scenarios_from_reader(SHEET.as_bytes()).unwrap();
        assert_eq!(scenarios.len(), 3);

        let reference = &scenarios[0].params;
        assert_eq!(scenarios[0].name, "reference");
        assert_eq!(reference.notary_fees, 16_000.0);
        assert_eq!(reference.loan_amount, 176_000.0);
        assert_eq!(reference.fiscal.letting, Letting::Unfurnished);
        assert_eq!(reference.fiscal.scheme, TaxScheme::Actual);
        assert_eq!(reference.tax_regime(), TaxRegime::ReelFoncier);

        let furnished = &scenarios[1].params;
        assert_eq!(furnished.energy_class, EnergyClass::D);
        assert_eq!(
            furnished.tax_regime(),
            TaxRegime::ReelBic(LandlordStatus::NonProfessional)
        );
    }

    #[test]
    fn test_incentive_rows_carry_program_data() {
        let scenarios = load_scenarios_from_reader(SHEET.as_bytes()).unwrap();
        let pinel = &scenarios[2].params;
        // new build: 2.5 % notary estimate
        assert_eq!(pinel.notary_fees, 6_250.0);
        assert_eq!(
            pinel.fiscal.incentive,
            Some(IncentiveProgram::Pinel {
                commitment: Commitment::Twelve,
                investment_year: None,
            })
        );
    }

    #[test]
    fn test_unknown_regime_fails_fast() {
        let sheet = "\
name,price,property_kind,monthly_rent,regime,marginal_rate_pct,horizon_years
bad,100000,existing,500,scpi,30,10
";
        let err = load_scenarios_from_reader(sheet.as_bytes()).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownTag { kind: "regime", .. }));
    }

    #[test]
    fn test_invalid_commitment_rejected() {
        let sheet = "\
name,price,property_kind,monthly_rent,regime,marginal_rate_pct,commitment_years,horizon_years
bad,100000,existing,500,denormandie,30,10,10
";
        let err = load_scenarios_from_reader(sheet.as_bytes()).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput(_)));
    }
}
