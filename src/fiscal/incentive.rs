//! Tax-reduction programs: capped base, tiered rate, per-year payout window

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Eligible base cap for the price-linked programs
pub const PRICE_BASE_CAP: f64 = 300_000.0;
/// Eligible works cap for the heritage-restoration program
pub const HERITAGE_WORKS_CAP: f64 = 400_000.0;
/// Heritage-restoration reductions are spread over the works period
pub const HERITAGE_WORKS_YEARS: u32 = 4;
/// Investments made from this year on use the reformed rate schedule
pub const REFORMED_SCHEDULE_YEAR: i32 = 2023;

/// Heritage reduction rate inside a protected sector (%)
const HERITAGE_PROTECTED_RATE_PCT: f64 = 30.0;
/// Heritage reduction rate elsewhere (%)
const HERITAGE_OTHER_RATE_PCT: f64 = 22.0;

/// Which program a regime belongs to, without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncentiveKind {
    Pinel,
    Denormandie,
    Malraux,
}

impl IncentiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncentiveKind::Pinel => "pinel",
            IncentiveKind::Denormandie => "denormandie",
            IncentiveKind::Malraux => "malraux",
        }
    }
}

impl fmt::Display for IncentiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Letting commitment for the price-linked programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Commitment {
    Six,
    Nine,
    Twelve,
}

impl Commitment {
    pub fn years(&self) -> u32 {
        match self {
            Commitment::Six => 6,
            Commitment::Nine => 9,
            Commitment::Twelve => 12,
        }
    }
}

impl TryFrom<u32> for Commitment {
    type Error = SimulationError;

    fn try_from(years: u32) -> Result<Self, Self::Error> {
        match years {
            6 => Ok(Commitment::Six),
            9 => Ok(Commitment::Nine),
            12 => Ok(Commitment::Twelve),
            other => Err(SimulationError::InvalidInput(format!(
                "commitment must be 6, 9 or 12 years, got {other}"
            ))),
        }
    }
}

impl From<Commitment> for u32 {
    fn from(commitment: Commitment) -> Self {
        commitment.years()
    }
}

/// Location of a heritage-restoration project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeritageZone {
    ProtectedSector,
    Other,
}

impl FromStr for HeritageZone {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protected-sector" | "secteur-sauvegarde" | "secteur_sauvegarde" => {
                Ok(HeritageZone::ProtectedSector)
            }
            "" | "other" | "autre" => Ok(HeritageZone::Other),
            _ => Err(SimulationError::unknown_tag("heritage zone", s)),
        }
    }
}

/// A declared tax-reduction program with its own parameters
///
/// Missing years default to the first projected calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "program", rename_all = "kebab-case")]
pub enum IncentiveProgram {
    /// New-build letting commitment, base is the price
    Pinel {
        commitment: Commitment,
        #[serde(default)]
        investment_year: Option<i32>,
    },
    /// Existing property with works, base is price plus renovation works
    Denormandie {
        commitment: Commitment,
        #[serde(default)]
        investment_year: Option<i32>,
    },
    /// Heritage restoration, base is the restoration works only
    Malraux {
        works_amount: f64,
        zone: HeritageZone,
        #[serde(default)]
        works_start_year: Option<i32>,
    },
}

/// Headline figures of a program
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IncentiveReduction {
    pub annual_reduction: f64,
    pub total_reduction: f64,
    pub duration_years: u32,
}

/// Year-by-year payout of a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveSchedule {
    pub kind: IncentiveKind,
    /// Capped eligible base
    pub base: f64,
    /// Total reduction rate (%)
    pub rate_pct: f64,
    pub total_reduction: f64,
    pub duration_years: u32,
    /// First calendar year a reduction is paid
    pub first_year: i32,
    /// Reduction paid in each year of the window, in order
    pub yearly: Vec<f64>,
}

impl IncentiveProgram {
    pub fn kind(&self) -> IncentiveKind {
        match self {
            IncentiveProgram::Pinel { .. } => IncentiveKind::Pinel,
            IncentiveProgram::Denormandie { .. } => IncentiveKind::Denormandie,
            IncentiveProgram::Malraux { .. } => IncentiveKind::Malraux,
        }
    }

    /// Build the payout schedule for this program
    ///
    /// `price` and `renovation_works` come from the acquisition; `default_year`
    /// stands in for any year the program leaves unset.
    pub fn schedule(&self, price: f64, renovation_works: f64, default_year: i32) -> IncentiveSchedule {
        match *self {
            IncentiveProgram::Pinel {
                commitment,
                investment_year,
            } => price_linked_schedule(
                IncentiveKind::Pinel,
                price,
                commitment,
                investment_year.unwrap_or(default_year),
            ),
            IncentiveProgram::Denormandie {
                commitment,
                investment_year,
            } => price_linked_schedule(
                IncentiveKind::Denormandie,
                price + renovation_works,
                commitment,
                investment_year.unwrap_or(default_year),
            ),
            IncentiveProgram::Malraux {
                works_amount,
                zone,
                works_start_year,
            } => heritage_schedule(works_amount, zone, works_start_year.unwrap_or(default_year)),
        }
    }
}

/// Total reduction rate (%) of a price-linked program.
/// Investments before the reform keep the legacy rates.
pub fn price_linked_rate_pct(investment_year: i32, commitment: Commitment) -> f64 {
    let legacy = investment_year < REFORMED_SCHEDULE_YEAR;
    match (commitment, legacy) {
        (Commitment::Six, true) => 12.0,
        (Commitment::Nine, true) => 18.0,
        (Commitment::Twelve, true) => 21.0,
        (Commitment::Six, false) => 9.0,
        (Commitment::Nine, false) => 12.0,
        (Commitment::Twelve, false) => 14.0,
    }
}

fn price_linked_schedule(
    kind: IncentiveKind,
    eligible: f64,
    commitment: Commitment,
    investment_year: i32,
) -> IncentiveSchedule {
    let base = eligible.clamp(0.0, PRICE_BASE_CAP);
    let rate_pct = price_linked_rate_pct(investment_year, commitment);
    let total_reduction = base * rate_pct / 100.0;
    let duration_years = commitment.years();

    // 12-year commitments pay 2 shares a year for 9 years then 1 share for 3
    let yearly = match commitment {
        Commitment::Twelve => {
            let share = total_reduction / 21.0;
            (1..=duration_years)
                .map(|year| if year <= 9 { 2.0 * share } else { share })
                .collect()
        }
        Commitment::Six | Commitment::Nine => {
            vec![total_reduction / duration_years as f64; duration_years as usize]
        }
    };

    IncentiveSchedule {
        kind,
        base,
        rate_pct,
        total_reduction,
        duration_years,
        first_year: investment_year,
        yearly,
    }
}

fn heritage_schedule(works_amount: f64, zone: HeritageZone, start_year: i32) -> IncentiveSchedule {
    let base = works_amount.clamp(0.0, HERITAGE_WORKS_CAP);
    let rate_pct = match zone {
        HeritageZone::ProtectedSector => HERITAGE_PROTECTED_RATE_PCT,
        HeritageZone::Other => HERITAGE_OTHER_RATE_PCT,
    };
    let total_reduction = base * rate_pct / 100.0;

    IncentiveSchedule {
        kind: IncentiveKind::Malraux,
        base,
        rate_pct,
        total_reduction,
        duration_years: HERITAGE_WORKS_YEARS,
        first_year: start_year,
        yearly: vec![total_reduction / HERITAGE_WORKS_YEARS as f64; HERITAGE_WORKS_YEARS as usize],
    }
}

impl IncentiveSchedule {
    /// Average reduction per year of the window
    pub fn annual_reduction(&self) -> f64 {
        if self.duration_years == 0 {
            0.0
        } else {
            self.total_reduction / self.duration_years as f64
        }
    }

    pub fn last_year(&self) -> i32 {
        self.first_year + self.duration_years as i32 - 1
    }

    pub fn in_window(&self, calendar_year: i32) -> bool {
        calendar_year >= self.first_year && calendar_year <= self.last_year()
    }

    /// Reduction payable in `calendar_year`, zero outside the window
    pub fn reduction_for_year(&self, calendar_year: i32) -> f64 {
        if !self.in_window(calendar_year) {
            return 0.0;
        }
        let idx = (calendar_year - self.first_year) as usize;
        self.yearly.get(idx).copied().unwrap_or(0.0)
    }

    pub fn reduction(&self) -> IncentiveReduction {
        IncentiveReduction {
            annual_reduction: self.annual_reduction(),
            total_reduction: self.total_reduction,
            duration_years: self.duration_years,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nine_year_window_and_total() {
        let program = IncentiveProgram::Pinel {
            commitment: Commitment::Nine,
            investment_year: Some(2021),
        };
        let schedule = program.schedule(250_000.0, 0.0, 2030);

        assert_eq!(schedule.first_year, 2021);
        assert_eq!(schedule.reduction_for_year(2020), 0.0);
        assert_eq!(schedule.reduction_for_year(2030), 0.0);

        let paid: f64 = (2021..=2029).map(|y| schedule.reduction_for_year(y)).sum();
        assert_relative_eq!(paid, 250_000.0 * 0.18, epsilon = 1e-6);
        assert_relative_eq!(schedule.annual_reduction(), 5_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reformed_schedule_selected_by_year() {
        assert_eq!(price_linked_rate_pct(2022, Commitment::Six), 12.0);
        assert_eq!(price_linked_rate_pct(2023, Commitment::Six), 9.0);
        assert_eq!(price_linked_rate_pct(2024, Commitment::Twelve), 14.0);
    }

    #[test]
    fn test_base_capped_at_300k() {
        let program = IncentiveProgram::Pinel {
            commitment: Commitment::Six,
            investment_year: Some(2020),
        };
        let schedule = program.schedule(450_000.0, 0.0, 2020);
        assert_eq!(schedule.base, PRICE_BASE_CAP);
        assert_relative_eq!(schedule.total_reduction, 36_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_twelve_year_split_is_not_uniform() {
        let program = IncentiveProgram::Pinel {
            commitment: Commitment::Twelve,
            investment_year: Some(2020),
        };
        let schedule = program.schedule(200_000.0, 0.0, 2020);

        assert_relative_eq!(schedule.reduction_for_year(2020), 4_000.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.reduction_for_year(2028), 4_000.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.reduction_for_year(2029), 2_000.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.reduction_for_year(2031), 2_000.0, epsilon = 1e-9);
        assert_eq!(schedule.reduction_for_year(2032), 0.0);

        let paid: f64 = schedule.yearly.iter().sum();
        assert_relative_eq!(paid, schedule.total_reduction, epsilon = 1e-6);
    }

    #[test]
    fn test_denormandie_base_includes_works() {
        let program = IncentiveProgram::Denormandie {
            commitment: Commitment::Nine,
            investment_year: Some(2024),
        };
        let schedule = program.schedule(150_000.0, 60_000.0, 2024);
        assert_relative_eq!(schedule.base, 210_000.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.total_reduction, 25_200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_heritage_ignores_price() {
        let protected = IncentiveProgram::Malraux {
            works_amount: 500_000.0,
            zone: HeritageZone::ProtectedSector,
            works_start_year: None,
        };
        let schedule = protected.schedule(1_000_000.0, 0.0, 2026);
        assert_eq!(schedule.base, HERITAGE_WORKS_CAP);
        assert_relative_eq!(schedule.total_reduction, 120_000.0, epsilon = 1e-9);
        assert_eq!(schedule.duration_years, 4);
        assert_relative_eq!(schedule.reduction_for_year(2029), 30_000.0, epsilon = 1e-9);
        assert_eq!(schedule.reduction_for_year(2030), 0.0);

        let other = IncentiveProgram::Malraux {
            works_amount: 100_000.0,
            zone: HeritageZone::Other,
            works_start_year: Some(2026),
        };
        let reduction = other.schedule(0.0, 0.0, 2026).reduction();
        assert_relative_eq!(reduction.total_reduction, 22_000.0, epsilon = 1e-9);
        assert_relative_eq!(reduction.annual_reduction, 5_500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_commitment_from_years() {
        assert_eq!(Commitment::try_from(9).unwrap(), Commitment::Nine);
        assert!(Commitment::try_from(10).is_err());
        let program: IncentiveProgram =
            serde_json::from_str(r#"{"program":"pinel","commitment":12}"#).unwrap();
        assert_eq!(
            program,
            IncentiveProgram::Pinel {
                commitment: Commitment::Twelve,
                investment_year: None
            }
        );
    }
}
