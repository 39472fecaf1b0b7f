//! 256-bit intermediates for fixed-point multiply and divide.
//!
//! A product of two `u128` values needs up to 256 bits. The pricing engine
//! routinely multiplies values whose raw representation is above 10^20
//! (positions, the liquidity parameter), so every scaled multiply and divide
//! goes through [`mul_div`].

const LOW_MASK: u128 = u64::MAX as u128;

/// Full 128 x 128 -> 256 bit product, returned as `(high, low)` words.
#[inline]
pub fn full_mul(a: u128, b: u128) -> (u128, u128) {
    let (a_hi, a_lo) = (a >> 64, a & LOW_MASK);
    let (b_hi, b_lo) = (b >> 64, b & LOW_MASK);

    let lo_lo = a_lo * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_lo = a_hi * b_lo;
    let hi_hi = a_hi * b_hi;

    // Each addend is below 2^64, so the sum fits comfortably
    let middle = (lo_lo >> 64) + (lo_hi & LOW_MASK) + (hi_lo & LOW_MASK);

    let low = (lo_lo & LOW_MASK) | (middle << 64);
    let high = hi_hi + (lo_hi >> 64) + (hi_lo >> 64) + (middle >> 64);
    (high, low)
}

/// Compute `floor(a * b / d)` without intermediate overflow.
///
/// # Returns
///
/// * `Some(q)` - The truncated quotient
/// * `None` - If `d` is zero or the quotient does not fit in 128 bits
///
/// # Example
///
/// ```
/// use lmsr_markets::math::wide::mul_div;
///
/// let wad = 1_000_000_000_000_000_000u128;
/// // 10^21 * 10^21 / 10^18 overflows u128 in the intermediate, not here
/// assert_eq!(mul_div(1_000 * wad, 1_000 * wad, wad), Some(1_000_000 * wad));
/// assert_eq!(mul_div(1, 1, 0), None);
/// ```
pub fn mul_div(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }

    let (high, low) = full_mul(a, b);
    if high == 0 {
        return Some(low / d);
    }
    if high >= d {
        return None;
    }

    // Restoring long division of the 256-bit product, one bit at a time.
    // `remainder < d` holds at the top of every iteration.
    let mut remainder = high;
    let mut quotient: u128 = 0;
    for bit in (0..128).rev() {
        let carry = remainder >> 127;
        remainder = (remainder << 1) | ((low >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || remainder >= d {
            remainder = remainder.wrapping_sub(d);
            quotient |= 1;
        }
    }
    Some(quotient)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mul_small() {
        assert_eq!(full_mul(0, 12345), (0, 0));
        assert_eq!(full_mul(6, 7), (0, 42));
        assert_eq!(full_mul(1 << 64, 1 << 64), (1, 0));
    }

    #[test]
    fn test_full_mul_max() {
        // (2^128 - 1)^2 = 2^256 - 2^129 + 1
        assert_eq!(full_mul(u128::MAX, u128::MAX), (u128::MAX - 1, 1));
        assert_eq!(full_mul(u128::MAX, 2), (1, u128::MAX - 1));
    }

    #[test]
    fn test_mul_div_fast_path() {
        assert_eq!(mul_div(10, 20, 3), Some(66));
        assert_eq!(mul_div(0, u128::MAX, 7), Some(0));
    }

    #[test]
    fn test_mul_div_wide_path() {
        let e30 = 10u128.pow(30);
        assert_eq!(mul_div(e30, e30, 10u128.pow(24)), Some(10u128.pow(36)));
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX), Some(u128::MAX));
        assert_eq!(mul_div(u128::MAX, 3, 4), Some(u128::MAX / 4 * 3 + 2));
    }

    #[test]
    fn test_mul_div_truncates() {
        let e20 = 10u128.pow(20);
        // 10^40 = (10^20 + 1)(10^20 - 1) + 1, so the remainder is 1
        let q = mul_div(e20, e20, e20 + 1).unwrap();
        assert_eq!(q, e20 - 1);
    }

    #[test]
    fn test_mul_div_overflow() {
        assert_eq!(mul_div(u128::MAX, u128::MAX, 1), None);
        assert_eq!(mul_div(u128::MAX, 2, 1), None);
        assert_eq!(mul_div(5, 5, 0), None);
    }
}
