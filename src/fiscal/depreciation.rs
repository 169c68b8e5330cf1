//! Depreciation plan for furnished actual-expense letting

use serde::{Deserialize, Serialize};

/// Depreciable share of the price (land is not depreciated)
pub const BUILDING_SHARE: f64 = 0.85;
pub const BUILDING_LIFE_YEARS: u32 = 25;
pub const FURNITURE_LIFE_YEARS: u32 = 7;
pub const WORKS_LIFE_YEARS: u32 = 10;

/// One straight-line depreciable asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepreciableComponent {
    pub value: f64,
    pub life_years: u32,
}

impl DepreciableComponent {
    pub fn new(value: f64, life_years: u32) -> Self {
        Self { value, life_years }
    }

    /// Allowance for the 1-indexed projection year, zero once fully depreciated
    pub fn allowance(&self, year: u32) -> f64 {
        if self.life_years == 0 || year == 0 || year > self.life_years || self.value <= 0.0 {
            0.0
        } else {
            self.value / self.life_years as f64
        }
    }
}

/// Building, furniture and works depreciated over their own lives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepreciationPlan {
    pub building: DepreciableComponent,
    pub furniture: DepreciableComponent,
    pub works: DepreciableComponent,
}

impl DepreciationPlan {
    pub fn new(price: f64, furniture_value: f64, works_value: f64) -> Self {
        Self {
            building: DepreciableComponent::new(price * BUILDING_SHARE, BUILDING_LIFE_YEARS),
            furniture: DepreciableComponent::new(furniture_value, FURNITURE_LIFE_YEARS),
            works: DepreciableComponent::new(works_value, WORKS_LIFE_YEARS),
        }
    }

    /// A plan that never produces an allowance
    pub fn none() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// New depreciation generated in the 1-indexed projection year
    pub fn annual_allowance(&self, year: u32) -> f64 {
        self.building.allowance(year) + self.furniture.allowance(year) + self.works.allowance(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_year_allowance() {
        let plan = DepreciationPlan::new(200_000.0, 7_000.0, 20_000.0);
        // 170000/25 + 7000/7 + 20000/10
        assert_relative_eq!(plan.annual_allowance(1), 6_800.0 + 1_000.0 + 2_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_components_expire_on_their_own_lives() {
        let plan = DepreciationPlan::new(200_000.0, 7_000.0, 20_000.0);
        assert_relative_eq!(plan.annual_allowance(7), 9_800.0, epsilon = 1e-9);
        assert_relative_eq!(plan.annual_allowance(8), 8_800.0, epsilon = 1e-9);
        assert_relative_eq!(plan.annual_allowance(11), 6_800.0, epsilon = 1e-9);
        assert_eq!(plan.annual_allowance(26), 0.0);
    }

    #[test]
    fn test_total_equals_depreciable_value() {
        let plan = DepreciationPlan::new(180_000.0, 9_000.0, 15_000.0);
        let total: f64 = (1..=40).map(|y| plan.annual_allowance(y)).sum();
        assert_relative_eq!(total, 180_000.0 * BUILDING_SHARE + 9_000.0 + 15_000.0, epsilon = 1e-6);
        assert_eq!(DepreciationPlan::none().annual_allowance(1), 0.0);
    }
}
