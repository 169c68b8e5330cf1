//! Capital-gains tax on resale with holding-period allowances

use serde::{Deserialize, Serialize};

/// Flat income-tax rate on the gain (%)
pub const GAIN_INCOME_TAX_PCT: f64 = 19.0;
/// Flat social-levy rate on the gain (%)
pub const GAIN_SOCIAL_LEVY_PCT: f64 = 17.2;
/// Holding period after which the gain is fully exempt
pub const FULL_EXEMPTION_YEARS: u32 = 30;

/// Allowances (%) earned by holding duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldingAllowance {
    pub income_tax_pct: f64,
    pub social_levy_pct: f64,
}

/// Tax due on a resale
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CapitalGainsTax {
    pub gross_gain: f64,
    pub taxable_gain_income: f64,
    pub taxable_gain_social: f64,
    pub income_tax: f64,
    pub social_tax: f64,
    pub total_tax: f64,
}

/// Income-tax allowance: 6 %/year for years 6-21, full from year 22
pub fn income_tax_allowance_pct(years_held: u32) -> f64 {
    match years_held {
        0..=5 => 0.0,
        6..=21 => (years_held - 5) as f64 * 6.0,
        _ => 100.0,
    }
}

/// Social-levy allowance: 1.65 %/year for years 6-21, 1.6 %/year for 22-29,
/// full from year 30
pub fn social_levy_allowance_pct(years_held: u32) -> f64 {
    match years_held {
        0..=5 => 0.0,
        6..=21 => (years_held - 5) as f64 * 1.65,
        22..=29 => 16.0 * 1.65 + (years_held - 21) as f64 * 1.6,
        _ => 100.0,
    }
}

pub fn holding_allowance(years_held: u32) -> HoldingAllowance {
    HoldingAllowance {
        income_tax_pct: income_tax_allowance_pct(years_held),
        social_levy_pct: social_levy_allowance_pct(years_held),
    }
}

/// Tax due when selling at `sale_price` after `years_held` years
pub fn capital_gains_tax(
    sale_price: f64,
    acquisition_price: f64,
    acquisition_costs: f64,
    years_held: u32,
) -> CapitalGainsTax {
    let gross_gain = sale_price - acquisition_price - acquisition_costs;

    if gross_gain <= 0.0 || years_held >= FULL_EXEMPTION_YEARS {
        return CapitalGainsTax {
            gross_gain,
            ..Default::default()
        };
    }

    let allowance = holding_allowance(years_held);
    let taxable_gain_income = gross_gain * (1.0 - allowance.income_tax_pct / 100.0);
    let taxable_gain_social = gross_gain * (1.0 - allowance.social_levy_pct / 100.0);
    let income_tax = taxable_gain_income * GAIN_INCOME_TAX_PCT / 100.0;
    let social_tax = taxable_gain_social * GAIN_SOCIAL_LEVY_PCT / 100.0;

    CapitalGainsTax {
        gross_gain,
        taxable_gain_income,
        taxable_gain_social,
        income_tax,
        social_tax,
        total_tax: income_tax + social_tax,
    }
}
