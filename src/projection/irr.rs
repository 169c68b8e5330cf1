//! Internal Rate of Return (IRR) on yearly investor cash flows
//!
//! Newton-Raphson from several seeds, with a bisection fallback when no seed
//! lands on a plausible root.

use log::debug;

/// Lowest rate the iterate may reach; (1 + rate) must stay positive
const RATE_FLOOR: f64 = -0.99;
/// Roots outside (RATE_FLOOR, RATE_CEILING) are treated as numerical artifacts
const RATE_CEILING: f64 = 10.0;
const NPV_TOLERANCE: f64 = 1e-7;
const STEP_TOLERANCE: f64 = 1e-12;
const MAX_ITERATIONS: usize = 200;

/// Seeds tried after the caller's guess
const ALTERNATE_SEEDS: [f64; 4] = [0.05, 0.15, 0.25, -0.05];

/// Net present value of `cashflows` at `rate`, flow `t` discounted `t` years
pub fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / (discount * (1.0 + rate));
        }
    }

    (npv, dnpv)
}

/// Whether an IRR can exist at all: two flows or more, with both signs
fn has_sign_change(cashflows: &[f64]) -> bool {
    cashflows.len() >= 2
        && cashflows.iter().any(|&cf| cf > 0.0)
        && cashflows.iter().any(|&cf| cf < 0.0)
}

fn is_plausible(rate: f64) -> bool {
    rate.is_finite() && rate > RATE_FLOOR && rate < RATE_CEILING
}

/// Newton-Raphson from one seed. Oscillating iterates are damped by
/// averaging the last two.
fn newton_from(cashflows: &[f64], seed: f64) -> Option<f64> {
    let mut rate = seed;
    let mut previous_step = 0.0_f64;

    for _ in 0..MAX_ITERATIONS {
        let (value, derivative) = npv_and_derivative(cashflows, rate);
        if value.abs() < NPV_TOLERANCE {
            return Some(rate);
        }
        if derivative.abs() < 1e-20 || !derivative.is_finite() {
            return None;
        }

        let mut step = -value / derivative;
        // sign flip with no shrink: swinging around the root
        if step * previous_step < 0.0 && step.abs() >= previous_step.abs() {
            step /= 2.0;
        }

        let next = (rate + step).max(RATE_FLOOR);
        if (next - rate).abs() < STEP_TOLERANCE {
            return Some(next);
        }
        previous_step = next - rate;
        rate = next;
    }

    None
}

/// Bisection over the plausible band, used when every seed fails
fn bisection(cashflows: &[f64]) -> Option<f64> {
    let mut low = RATE_FLOOR + 1e-9;
    let mut high = RATE_CEILING - 1e-9;
    let mut npv_low = npv(cashflows, low);
    let npv_high = npv(cashflows, high);

    if !npv_low.is_finite() || !npv_high.is_finite() || npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..1000 {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(cashflows, mid);

        if npv_mid.abs() < NPV_TOLERANCE || (high - low) / 2.0 < STEP_TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

/// Solve for the yearly rate (as a fraction) zeroing the NPV of `cashflows`
///
/// Returns `None` when no IRR is defined or none was found in the plausible
/// band.
pub fn solve_irr(cashflows: &[f64], guess: f64) -> Option<f64> {
    if !has_sign_change(cashflows) {
        return None;
    }

    let seeds = std::iter::once(guess).chain(ALTERNATE_SEEDS);
    for seed in seeds {
        match newton_from(cashflows, seed) {
            Some(rate) if is_plausible(rate) => {
                debug!("IRR converged from seed {seed}: {rate:.6}");
                return Some(rate);
            }
            Some(rate) => debug!("IRR seed {seed} gave implausible root {rate}"),
            None => debug!("IRR seed {seed} did not converge"),
        }
    }

    bisection(cashflows).filter(|&rate| is_plausible(rate))
}

/// IRR as a percentage, or 0.0 when there is no meaningful IRR
pub fn irr(cashflows: &[f64], guess: f64) -> f64 {
    solve_irr(cashflows, guess).map_or(0.0, |rate| rate * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_one_year_ten_percent() {
        assert_relative_eq!(irr(&[-100_000.0, 110_000.0], 0.1), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_sign_change_is_zero() {
        assert_eq!(irr(&[100.0, 200.0, 300.0], 0.1), 0.0);
        assert_eq!(irr(&[-100.0, 0.0, 0.0, 0.0], 0.1), 0.0);
        assert_eq!(irr(&[-100.0], 0.1), 0.0);
        assert!(solve_irr(&[], 0.1).is_none());
    }

    #[test]
    fn test_level_annuity() {
        // 1000 now for 5 x 263.797 is 10 %
        let mut flows = vec![-1_000.0];
        flows.extend([263.797_48; 5]);
        assert_relative_eq!(irr(&flows, 0.1), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bad_guess_still_converges() {
        let flows = [-56_000.0, -3_000.0, -3_000.0, 2_000.0, 90_000.0];
        let rate = solve_irr(&flows, 5.0).unwrap();
        assert_relative_eq!(npv(&flows, rate), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_negative_irr() {
        let rate = solve_irr(&[-1_000.0, 200.0, 200.0, 200.0], 0.1).unwrap();
        assert!(rate < 0.0);
        assert_relative_eq!(npv(&[-1_000.0, 200.0, 200.0, 200.0], rate), 0.0, epsilon = 1e-6);
    }
}
