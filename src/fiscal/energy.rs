//! Energy-performance rental constraints by calendar year

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// First calendar year a class-G unit may no longer be let
pub const BAN_YEAR_G: i32 = 2025;
/// First calendar year a class-F unit may no longer be let
pub const BAN_YEAR_F: i32 = 2028;
/// First calendar year a class-E unit may no longer be let
pub const BAN_YEAR_E: i32 = 2034;
/// Rent freeze on F and G units applies from this year on
pub const RENT_FREEZE_YEAR: i32 = 2022;

/// Energy-performance class, A best to G worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum EnergyClass {
    A,
    B,
    C,
    #[default]
    D,
    E,
    F,
    G,
}

/// Whether a unit may be let in a given year and whether its rent is frozen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalStatus {
    pub rentable: bool,
    pub rent_frozen: bool,
}

impl RentalStatus {
    pub const OPEN: RentalStatus = RentalStatus {
        rentable: true,
        rent_frozen: false,
    };
}

impl EnergyClass {
    /// Calendar year from which letting is banned, if any
    pub fn ban_year(&self) -> Option<i32> {
        match self {
            EnergyClass::G => Some(BAN_YEAR_G),
            EnergyClass::F => Some(BAN_YEAR_F),
            EnergyClass::E => Some(BAN_YEAR_E),
            EnergyClass::A | EnergyClass::B | EnergyClass::C | EnergyClass::D => None,
        }
    }

    /// Rental status of a unit of this class during `calendar_year`
    pub fn rental_status(&self, calendar_year: i32) -> RentalStatus {
        let rentable = self.ban_year().map_or(true, |ban| calendar_year < ban);
        let rent_frozen = matches!(self, EnergyClass::F | EnergyClass::G)
            && calendar_year >= RENT_FREEZE_YEAR;

        RentalStatus {
            rentable,
            rent_frozen,
        }
    }
}

impl FromStr for EnergyClass {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(EnergyClass::A),
            "B" => Ok(EnergyClass::B),
            "C" => Ok(EnergyClass::C),
            "" | "D" => Ok(EnergyClass::D),
            "E" => Ok(EnergyClass::E),
            "F" => Ok(EnergyClass::F),
            "G" => Ok(EnergyClass::G),
            _ => Err(SimulationError::unknown_tag("energy class", s)),
        }
    }
}
