//! Total cost of credit including borrower insurance

use serde::{Deserialize, Serialize};

use super::amortization::monthly_payment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanCost {
    /// Payment excluding insurance
    pub monthly_payment: f64,
    pub monthly_insurance: f64,
    pub total_interest: f64,
    pub total_insurance: f64,
    /// Interest plus insurance over the whole term
    pub total_cost: f64,
}

impl LoanCost {
    /// Cost of a loan whose insurance premium is a yearly percent of the
    /// borrowed amount
    pub fn compute(amount: f64, annual_rate_pct: f64, term_years: u32, insurance_pct: f64) -> Self {
        if amount <= 0.0 || term_years == 0 {
            return Self::default();
        }

        let months = (term_years * 12) as f64;
        let payment = monthly_payment(amount, annual_rate_pct, term_years);
        let monthly_insurance = amount * insurance_pct / 100.0 / 12.0;
        let total_interest = payment * months - amount;
        let total_insurance = monthly_insurance * months;

        Self {
            monthly_payment: payment,
            monthly_insurance,
            total_interest,
            total_insurance,
            total_cost: total_interest + total_insurance,
        }
    }

    /// Monthly outflow including insurance
    pub fn monthly_total(&self) -> f64 {
        self.monthly_payment + self.monthly_insurance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cost_of_reference_loan() {
        let cost = LoanCost::compute(176_000.0, 3.5, 20, 0.3);
        assert_relative_eq!(cost.monthly_insurance, 44.0, epsilon = 1e-9);
        assert_relative_eq!(cost.total_insurance, 10_560.0, epsilon = 1e-6);
        assert_relative_eq!(cost.total_interest, cost.monthly_payment * 240.0 - 176_000.0, epsilon = 1e-6);
        assert!(cost.total_interest > 68_000.0 && cost.total_interest < 69_000.0);
        assert_relative_eq!(cost.total_cost, cost.total_interest + cost.total_insurance, epsilon = 1e-9);
        assert_relative_eq!(cost.monthly_total(), cost.monthly_payment + 44.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_rate_has_no_interest() {
        let cost = LoanCost::compute(60_000.0, 0.0, 5, 0.0);
        assert_relative_eq!(cost.monthly_payment, 1_000.0, epsilon = 1e-9);
        assert_relative_eq!(cost.total_interest, 0.0, epsilon = 1e-6);
        assert_eq!(LoanCost::compute(0.0, 3.0, 20, 0.3), LoanCost::default());
    }
}
