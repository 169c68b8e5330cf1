//! Fixed-payment loan amortization, monthly rows aggregated per loan year

use serde::{Deserialize, Serialize};

/// One period of the schedule (a month, or a loan year once aggregated)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-indexed period
    pub period: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    /// Balance left after the period
    pub balance: f64,
}

/// Interest, principal and closing balance of one loan year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

/// Monthly schedule of a fixed-rate loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: f64,
    pub annual_rate_pct: f64,
    pub term_years: u32,
    pub monthly_payment: f64,
    pub rows: Vec<AmortizationRow>,
}

/// Annuity payment for a monthly-compounded loan
///
/// A zero rate amortizes linearly; a zero principal or term means no loan.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_years: u32) -> f64 {
    if principal <= 0.0 || term_years == 0 {
        return 0.0;
    }
    let months = (term_years * 12) as f64;
    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    if monthly_rate == 0.0 {
        return principal / months;
    }
    let growth = (1.0 + monthly_rate).powf(months);
    principal * monthly_rate * growth / (growth - 1.0)
}

impl AmortizationSchedule {
    /// Build the month-by-month schedule
    pub fn new(principal: f64, annual_rate_pct: f64, term_years: u32) -> Self {
        let payment = monthly_payment(principal, annual_rate_pct, term_years);
        let mut rows = Vec::new();

        if payment > 0.0 {
            let monthly_rate = annual_rate_pct / 100.0 / 12.0;
            let months = term_years * 12;
            rows.reserve(months as usize);
            let mut balance = principal;

            for period in 1..=months {
                let interest = balance * monthly_rate;
                // last row absorbs rounding drift
                let principal_part = if period == months {
                    balance
                } else {
                    (payment - interest).min(balance)
                };
                balance = (balance - principal_part).max(0.0);

                rows.push(AmortizationRow {
                    period,
                    payment: interest + principal_part,
                    interest,
                    principal: principal_part,
                    balance,
                });
            }
        }

        Self {
            principal,
            annual_rate_pct,
            term_years,
            monthly_payment: payment,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows aggregated per loan year; the period field is the loan year
    pub fn yearly(&self) -> Vec<AmortizationRow> {
        self.rows
            .chunks(12)
            .enumerate()
            .map(|(idx, months)| AmortizationRow {
                period: idx as u32 + 1,
                payment: months.iter().map(|m| m.payment).sum(),
                interest: months.iter().map(|m| m.interest).sum(),
                principal: months.iter().map(|m| m.principal).sum(),
                balance: months.last().map_or(0.0, |m| m.balance),
            })
            .collect()
    }

    /// Figures for the 1-indexed loan year; zeros with the last known
    /// balance (zero once repaid) outside the term
    pub fn year_summary(&self, year: u32) -> YearSummary {
        if year == 0 {
            return YearSummary {
                balance: self.principal.max(0.0),
                ..Default::default()
            };
        }
        let start = ((year - 1) * 12) as usize;
        match self.rows.get(start..(start + 12).min(self.rows.len())) {
            Some(months) if !months.is_empty() => YearSummary {
                interest: months.iter().map(|m| m.interest).sum(),
                principal: months.iter().map(|m| m.principal).sum(),
                balance: months.last().map_or(0.0, |m| m.balance),
            },
            _ => YearSummary {
                balance: self.rows.last().map_or(0.0, |m| m.balance),
                ..Default::default()
            },
        }
    }
}
