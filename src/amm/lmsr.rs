//! LMSR cost function, prices and trade sizing.
//!
//! ## Cost function
//!
//! `C(q) = b * ln(sum_i exp(q_i / b))`, evaluated in the shifted form
//!
//! ```text
//! C(q) = m + b * ln(sum_i exp((q_i - m) / b)),   m = max_i q_i
//! ```
//!
//! Every exponent is at most zero, so `exp` never saturates and the sum lies
//! in `[1, n]`. The same terms give the prices `p_i = exp_i / sum`.
//!
//! ## Rounding allowance
//!
//! Cost differences are computed from two truncated cost evaluations. To keep
//! every rounding error on the pool's side, each difference carries a
//! one-sided allowance `eps = b * 10^-16 + 1 raw`:
//!
//! - `buy_cost(d) = C(q + d*e_i) - C(q) + eps`
//! - `sell_return(d) = max(0, C(q) - C(q - d*e_i) - eps)`
//!
//! Buying `d` and selling it straight back therefore returns exactly
//! `buy_cost(d) - 2 * eps`.
//!
//! ## Trade sizing
//!
//! [`solve_buy`] finds the largest `d` with `buy_cost(d) <= budget`. The
//! bracket starts at `[0, 2 * budget]` and doubles its upper end until the
//! cost exceeds the budget, then bisects down to one raw unit.

use crate::error::{Error, Result};
use crate::math::{exp, ln, MathError};
use crate::types::Fixed;

/// Relative part of the rounding allowance: 10^-16 as a raw factor
pub const ALLOWANCE_FACTOR: Fixed = Fixed::from_raw(100);

/// Shifted exponentials `exp((q_i - m) / b)` and their sum
struct Terms {
    max: Fixed,
    exps: Vec<Fixed>,
    sum: Fixed,
}

fn terms(q: &[Fixed], b: Fixed) -> std::result::Result<Terms, MathError> {
    if !b.is_positive() {
        return Err(MathError::DivisionByZero);
    }
    let max = q.iter().copied().max().unwrap_or(Fixed::ZERO);

    let mut exps = Vec::with_capacity(q.len());
    let mut sum = Fixed::ZERO;
    for &qi in q {
        let exponent = match qi.try_sub(max)?.checked_div(b) {
            Some(exponent) => exp(exponent)?,
            // Quotient below i128::MIN: the term vanishes
            None => Fixed::ZERO,
        };
        sum = sum.try_add(exponent)?;
        exps.push(exponent);
    }
    Ok(Terms { max, exps, sum })
}

/// `C(q)` for liquidity parameter `b`.
///
/// # Example
///
/// ```
/// use lmsr_markets::amm::lmsr::cost;
/// use lmsr_markets::types::Fixed;
///
/// // Two outcomes, nothing sold: C = b * ln 2
/// let b = Fixed::from_int(100);
/// let c = cost(&[Fixed::ZERO, Fixed::ZERO], b).unwrap();
/// assert!((c.raw() - 69_314_718_055_994_530_941).abs() < 100_000);
/// ```
pub fn cost(q: &[Fixed], b: Fixed) -> std::result::Result<Fixed, MathError> {
    let terms = terms(q, b)?;
    let log_sum = ln(terms.sum)?;
    terms.max.try_add(b.try_mul(log_sum)?)
}

/// Instantaneous prices. They sum to `Fixed::ONE` within `q.len()` raw units.
pub fn prices(q: &[Fixed], b: Fixed) -> std::result::Result<Vec<Fixed>, MathError> {
    let terms = terms(q, b)?;
    terms.exps.iter().map(|&e| e.try_div(terms.sum)).collect()
}

/// `b * 10^-16 + 1 raw`
pub fn rounding_allowance(b: Fixed) -> std::result::Result<Fixed, MathError> {
    b.try_mul(ALLOWANCE_FACTOR)?.try_add(Fixed::from_raw(1))
}

/// Largest possible pool loss against any single outcome: `b * ln(n)`
pub fn max_loss(b: Fixed, outcomes: usize) -> std::result::Result<Fixed, MathError> {
    let n = i64::try_from(outcomes).map_err(|_| MathError::Overflow)?;
    b.try_mul(ln(Fixed::from_int(n))?)
}

fn shifted(q: &[Fixed], outcome: usize, delta: Fixed) -> std::result::Result<Vec<Fixed>, MathError> {
    let mut moved = q.to_vec();
    let entry = moved.get_mut(outcome).ok_or(MathError::Overflow)?;
    *entry = entry.try_add(delta)?;
    Ok(moved)
}

/// Collateral needed to buy `delta` tokens of `outcome`, allowance included
pub fn buy_cost(
    q: &[Fixed],
    b: Fixed,
    outcome: usize,
    delta: Fixed,
) -> std::result::Result<Fixed, MathError> {
    let after = cost(&shifted(q, outcome, delta)?, b)?;
    after
        .try_sub(cost(q, b)?)?
        .try_add(rounding_allowance(b)?)
}

/// Collateral returned for selling `delta` tokens of `outcome`, floored at zero
pub fn sell_return(
    q: &[Fixed],
    b: Fixed,
    outcome: usize,
    delta: Fixed,
) -> std::result::Result<Fixed, MathError> {
    let negated = delta.checked_neg().ok_or(MathError::Overflow)?;
    let after = cost(&shifted(q, outcome, negated)?, b)?;
    let gross = cost(q, b)?.try_sub(after)?;
    let net = gross.try_sub(rounding_allowance(b)?)?;
    Ok(net.max(Fixed::ZERO))
}

/// Largest token amount `d` with `buy_cost(d) <= budget`.
///
/// # Arguments
///
/// * `q` - Net-sold vector
/// * `b` - Liquidity parameter
/// * `outcome` - Index of the outcome bought
/// * `budget` - Collateral offered
/// * `max_doublings` - How often the bracket may double before giving up
///
/// # Errors
///
/// * `ZeroOutput` - not even one raw unit is affordable
/// * `QuoteOutOfRange` - the bracket never caught the budget
pub fn solve_buy(
    q: &[Fixed],
    b: Fixed,
    outcome: usize,
    budget: Fixed,
    max_doublings: u32,
) -> Result<Fixed> {
    if outcome >= q.len() {
        return Err(Error::OutcomeOutOfRange {
            outcome: u8::try_from(outcome).unwrap_or(u8::MAX),
            count: u8::try_from(q.len()).unwrap_or(u8::MAX),
        });
    }
    let budget_units = budget.to_amount().unwrap_or(0);

    // buy_cost(d) <= budget  <=>  C(q + d*e_i) <= C(q) + budget - eps
    let target = cost(q, b)?
        .try_add(budget)?
        .try_sub(rounding_allowance(b)?)?;
    let affordable = |delta: Fixed| -> Result<bool> {
        let moved = match shifted(q, outcome, delta) {
            Ok(moved) => moved,
            Err(MathError::Overflow) => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        match cost(&moved, b) {
            Ok(after) => Ok(after <= target),
            Err(MathError::Overflow) => Ok(false),
            Err(err) => Err(err.into()),
        }
    };

    let mut lo = Fixed::ZERO;
    let mut hi = budget
        .checked_mul_int(2)
        .unwrap_or(Fixed::MAX)
        .max(Fixed::from_raw(1));
    let mut doublings = 0;
    while affordable(hi)? {
        if doublings == max_doublings {
            return Err(Error::QuoteOutOfRange(budget_units));
        }
        lo = hi;
        hi = hi
            .checked_mul_int(2)
            .ok_or(Error::QuoteOutOfRange(budget_units))?;
        doublings += 1;
    }

    // affordable(lo) || lo == 0, and !affordable(hi)
    while hi.raw() - lo.raw() > 1 {
        let mid = Fixed::from_raw(lo.raw() + (hi.raw() - lo.raw()) / 2);
        if affordable(mid)? {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    if lo.is_zero() {
        return Err(Error::ZeroOutput);
    }
    Ok(lo)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WAD;

    fn fx(s: &str) -> Fixed {
        s.parse().unwrap()
    }

    fn zeros(n: usize) -> Vec<Fixed> {
        vec![Fixed::ZERO; n]
    }

    fn sum(values: &[Fixed]) -> i128 {
        values.iter().map(|v| v.raw()).sum()
    }

    #[test]
    fn test_uniform_prices() {
        let b = Fixed::from_int(1_000);
        assert_eq!(prices(&zeros(2), b).unwrap(), vec![fx("0.5"), fx("0.5")]);
        assert_eq!(prices(&zeros(4), b).unwrap(), vec![fx("0.25"); 4]);
    }

    #[test]
    fn test_prices_normalized() {
        let b = Fixed::from_int(50);
        for n in 2..=8usize {
            let q: Vec<Fixed> = (0..n)
                .map(|i| Fixed::from_int(i as i64 * 37 - 90))
                .collect();
            let p = prices(&q, b).unwrap();
            let total = sum(&p);
            assert!(total <= WAD && total >= WAD - n as i128, "n={} total={}", n, total);
        }
    }

    #[test]
    fn test_cost_of_empty_book() {
        let b = Fixed::from_int(10);
        let c = cost(&zeros(3), b).unwrap();
        let expected = max_loss(b, 3).unwrap();
        assert_eq!(c, expected);
    }

    #[test]
    fn test_cost_bounds() {
        // max q <= C(q) <= max q + b ln n
        let b = Fixed::from_int(20);
        let q = vec![Fixed::from_int(30), Fixed::from_int(-5), Fixed::from_int(12)];
        let c = cost(&q, b).unwrap();
        assert!(c >= Fixed::from_int(30));
        assert!(c <= Fixed::from_int(30).checked_add(max_loss(b, 3).unwrap()).unwrap());
    }

    #[test]
    fn test_buying_raises_own_price() {
        let b = Fixed::from_int(100);
        let before = prices(&zeros(3), b).unwrap();
        let after = prices(&[Fixed::ZERO, Fixed::from_int(10), Fixed::ZERO], b).unwrap();
        assert!(after[1] > before[1]);
        assert!(after[0] < before[0]);
        assert!(after[2] < before[2]);
    }

    #[test]
    fn test_rounding_allowance() {
        assert_eq!(rounding_allowance(Fixed::from_raw(1_000_000_000)).unwrap().raw(), 1);
        assert_eq!(
            rounding_allowance(Fixed::from_int(1_000)).unwrap().raw(),
            100_000 + 1
        );
    }

    #[test]
    fn test_solve_buy_is_tight() {
        let b = Fixed::from_raw(1_000_000_000);
        let q = zeros(2);
        let budget = Fixed::from_raw(100_000_000);
        let delta = solve_buy(&q, b, 1, budget, 96).unwrap();
        assert!(buy_cost(&q, b, 1, delta).unwrap() <= budget);
        assert!(buy_cost(&q, b, 1, Fixed::from_raw(delta.raw() + 1)).unwrap() > budget);
        // price starts at 0.5, so the first tokens cost about half a unit each
        assert!(delta > budget);
        assert!(delta.raw() < 2 * budget.raw());
    }

    #[test]
    fn test_round_trip_loses_twice_the_allowance() {
        let b = Fixed::from_raw(1_000_000_000);
        let q = vec![Fixed::from_raw(300_000_000), Fixed::from_raw(-20_000_000)];
        let budget = Fixed::from_raw(55_555_555);
        let delta = solve_buy(&q, b, 0, budget, 96).unwrap();
        let paid = buy_cost(&q, b, 0, delta).unwrap();

        let after = vec![q[0].checked_add(delta).unwrap(), q[1]];
        let back = sell_return(&after, b, 0, delta).unwrap();
        let eps = rounding_allowance(b).unwrap();
        assert_eq!(back.raw(), paid.raw() - 2 * eps.raw());
        assert!(back < budget);
    }

    #[test]
    fn test_bracket_expands_for_cheap_outcomes() {
        // Outcome 1 is nearly worthless: far more than 2x the budget is affordable
        let b = Fixed::from_int(1);
        let q = vec![Fixed::from_int(10), Fixed::ZERO];
        let budget = Fixed::from_raw(1_000_000);
        let delta = solve_buy(&q, b, 1, budget, 96).unwrap();
        assert!(delta.raw() > 2 * budget.raw());
        assert!(buy_cost(&q, b, 1, delta).unwrap() <= budget);
    }

    #[test]
    fn test_bracket_limit() {
        let b = Fixed::from_int(1);
        let q = vec![Fixed::from_int(10), Fixed::ZERO];
        let budget = Fixed::from_raw(1_000_000);
        assert_eq!(
            solve_buy(&q, b, 1, budget, 0),
            Err(Error::QuoteOutOfRange(1_000_000))
        );
    }

    #[test]
    fn test_budget_below_allowance() {
        let b = Fixed::from_int(1_000);
        assert_eq!(
            solve_buy(&zeros(2), b, 0, Fixed::from_raw(10), 96),
            Err(Error::ZeroOutput)
        );
    }

    #[test]
    fn test_sell_return_floor() {
        let b = Fixed::from_int(1_000);
        // Selling one raw unit is worth less than the allowance
        assert_eq!(
            sell_return(&zeros(2), b, 0, Fixed::from_raw(1)).unwrap(),
            Fixed::ZERO
        );
    }

    #[test]
    fn test_max_loss() {
        let b = Fixed::from_int(1_000);
        let loss = max_loss(b, 2).unwrap();
        // 1000 * ln 2 = 693.147180559945309417
        assert!((loss.raw() - fx("693.147180559945309417").raw()).abs() < 1_000_000);
    }
}
