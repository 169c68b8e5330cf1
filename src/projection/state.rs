//! Cross-year state of one projection run

/// The only values one projected year hands to the next
///
/// Reset at the start of every run, owned by the year loop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectionState {
    /// Year about to be projected (1-indexed)
    pub year: u32,

    /// Unused depreciation carried from prior years
    pub carry_forward: f64,

    /// Sum of after-tax cash flows so far
    pub cumulative_cash_flow: f64,
}

impl ProjectionState {
    pub fn new() -> Self {
        Self {
            year: 1,
            ..Default::default()
        }
    }

    /// Close the current year and move to the next one
    pub fn advance(&mut self, carry_forward_out: f64, cash_flow_after_tax: f64) {
        self.carry_forward = carry_forward_out;
        self.cumulative_cash_flow += cash_flow_after_tax;
        self.year += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut state = ProjectionState::new();
        state.advance(1_500.0, -2_000.0);
        state.advance(500.0, 3_500.0);

        assert_eq!(state.year, 3);
        assert_eq!(state.carry_forward, 500.0);
        assert_eq!(state.cumulative_cash_flow, 1_500.0);
    }
}
