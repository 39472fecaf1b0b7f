//! Deterministic `exp` and `ln` over [`Fixed`].
//!
//! Both functions are built only from the truncating fixed-point operations
//! of [`Fixed`], so identical inputs produce bit-identical outputs on every
//! platform. The constants below (saturation bounds, series term limits)
//! are part of that contract: changing any of them changes prices.
//!
//! ## `exp`
//!
//! 1. Saturate: `x > EXP_MAX_INPUT` returns [`Fixed::MAX`], `x < EXP_MIN_INPUT`
//!    returns zero.
//! 2. Negative `x`: `1 / exp(-x)`.
//! 3. Split `x = k + f`, `k` integer, `f` in `[0, 1)`.
//! 4. `e^k` by repeated squaring of [`E`], `e^f` by Taylor series.
//!
//! ## `ln`
//!
//! 1. Divide by `E` while `x >= e`, multiply by `E` while `x < 1`, counting
//!    the steps as `k`.
//! 2. For the remaining `y` in `[1, e)`:
//!    `ln(y) = 2 * (z + z^3/3 + z^5/5 + ...)` with `z = (y - 1) / (y + 1)`.
//! 3. Return `k + ln(y)`.

use crate::math::MathError;
use crate::types::fixed::{Fixed, WAD};

/// Euler's number, truncated to 18 digits
pub const E: Fixed = Fixed::from_raw(2_718_281_828_459_045_235);

/// Largest argument evaluated by `exp` (e^46 ~ 9.5 * 10^19 still fits)
pub const EXP_MAX_INPUT: Fixed = Fixed::from_raw(46 * WAD);

/// Smallest argument evaluated by `exp` (e^-42 is below one raw unit)
pub const EXP_MIN_INPUT: Fixed = Fixed::from_raw(-42 * WAD);

/// Maximum Taylor terms for the fractional part of `exp`
pub const EXP_SERIES_TERMS: u32 = 32;

/// Maximum odd-power terms for the `ln` series
pub const LN_SERIES_TERMS: u32 = 48;

/// Natural exponential.
///
/// # Example
///
/// ```
/// use lmsr_markets::math::kernel::{exp, E};
/// use lmsr_markets::types::fixed::Fixed;
///
/// assert_eq!(exp(Fixed::ZERO).unwrap(), Fixed::ONE);
/// assert_eq!(exp(Fixed::from_int(100)).unwrap(), Fixed::MAX);
/// assert_eq!(exp(Fixed::from_int(-100)).unwrap(), Fixed::ZERO);
/// let e = exp(Fixed::ONE).unwrap();
/// assert!((e.raw() - E.raw()).abs() < 100);
/// ```
pub fn exp(x: Fixed) -> Result<Fixed, MathError> {
    if x > EXP_MAX_INPUT {
        return Ok(Fixed::MAX);
    }
    if x < EXP_MIN_INPUT {
        return Ok(Fixed::ZERO);
    }
    if x.is_negative() {
        let positive = x.checked_neg().ok_or(MathError::Overflow)?;
        return Fixed::ONE.try_div(exp_non_negative(positive)?);
    }
    exp_non_negative(x)
}

fn exp_non_negative(x: Fixed) -> Result<Fixed, MathError> {
    // x <= EXP_MAX_INPUT, so the integer part fits in a u32
    let whole = x.trunc() as u32;
    let integer_part = pow_e(whole)?;
    let fractional_part = exp_series(x.fract())?;
    integer_part.try_mul(fractional_part)
}

/// `e^k` by binary exponentiation
fn pow_e(mut k: u32) -> Result<Fixed, MathError> {
    let mut result = Fixed::ONE;
    let mut base = E;
    while k > 0 {
        if k & 1 == 1 {
            result = result.try_mul(base)?;
        }
        k >>= 1;
        if k > 0 {
            base = base.try_mul(base)?;
        }
    }
    Ok(result)
}

/// Taylor series for `e^f`, `f` in `[0, 1)`
fn exp_series(f: Fixed) -> Result<Fixed, MathError> {
    let mut sum = Fixed::ONE;
    let mut term = Fixed::ONE;
    for n in 1..=EXP_SERIES_TERMS {
        term = term
            .try_mul(f)?
            .checked_div_int(n as i128)
            .ok_or(MathError::Overflow)?;
        if term.is_zero() {
            break;
        }
        sum = sum.try_add(term)?;
    }
    Ok(sum)
}

/// Natural logarithm of a strictly positive value.
///
/// # Example
///
/// ```
/// use lmsr_markets::math::kernel::{ln, E};
/// use lmsr_markets::types::fixed::Fixed;
///
/// assert_eq!(ln(Fixed::ONE).unwrap(), Fixed::ZERO);
/// assert_eq!(ln(E).unwrap(), Fixed::ONE);
/// assert!(ln(Fixed::ZERO).is_err());
/// ```
pub fn ln(x: Fixed) -> Result<Fixed, MathError> {
    if !x.is_positive() {
        return Err(MathError::LnDomain);
    }

    let mut y = x;
    let mut k: i64 = 0;
    while y >= E {
        y = y.try_div(E)?;
        k += 1;
    }
    while y < Fixed::ONE {
        y = y.try_mul(E)?;
        k -= 1;
    }

    let z = y.try_sub(Fixed::ONE)?.try_div(y.try_add(Fixed::ONE)?)?;
    let z_squared = z.try_mul(z)?;

    let mut power = z;
    let mut series = z;
    for j in 1..LN_SERIES_TERMS {
        power = power.try_mul(z_squared)?;
        if power.is_zero() {
            break;
        }
        let term = power
            .checked_div_int(2 * j as i128 + 1)
            .ok_or(MathError::Overflow)?;
        series = series.try_add(term)?;
    }

    let fraction = series.checked_mul_int(2).ok_or(MathError::Overflow)?;
    Fixed::from_int(k).try_add(fraction)
}

// ============================================================================
// Unit Tests
// ============================================================================
