//! Signed fixed-point numbers with 18 fractional digits.
//!
//! ## Overview
//!
//! Every value the pricing engine touches is a [`Fixed`]: an `i128` scaled by
//! 10^18 (`WAD`). Amounts of collateral and outcome tokens are plain integers
//! in base units; the engine reads a base-unit amount `a` as the fixed-point
//! value whose raw representation is `a`.
//!
//! ## Rounding
//!
//! | Operation | Rule |
//! |-----------|------|
//! | add, sub  | exact, `None` on overflow |
//! | mul       | `a * b / 10^18`, magnitude truncated toward zero |
//! | div       | `a * 10^18 / b`, magnitude truncated toward zero |
//!
//! Multiply and divide use a 256-bit intermediate, so they only fail when the
//! final result is out of range.
//!
//! ## Examples
//!
//! ```
//! use lmsr_markets::types::fixed::Fixed;
//!
//! let half: Fixed = "0.5".parse().unwrap();
//! assert_eq!(half.raw(), 500_000_000_000_000_000);
//! assert_eq!(half.checked_mul(Fixed::from_int(3)), "1.5".parse().ok());
//! assert_eq!(half.to_string(), "0.5");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::math::wide::mul_div;
use crate::math::MathError;

/// Number of fractional decimal digits
pub const DECIMALS: u32 = 18;

/// Scaling factor: 10^18
pub const WAD: i128 = 1_000_000_000_000_000_000;

/// Signed fixed-point value, raw integer scaled by 10^18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(i128);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(WAD);
    pub const MAX: Fixed = Fixed(i128::MAX);

    /// Wrap a raw, already scaled value
    #[inline]
    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    /// Raw scaled representation
    #[inline]
    pub const fn raw(self) -> i128 {
        self.0
    }

    /// Whole number `value` as fixed-point
    #[inline]
    pub const fn from_int(value: i64) -> Self {
        Self(value as i128 * WAD)
    }

    /// Read a base-unit amount as a fixed-point value (raw = amount)
    pub fn from_amount(amount: u128) -> Option<Self> {
        i128::try_from(amount).ok().map(Self)
    }

    /// Base-unit amount for a non-negative value
    pub fn to_amount(self) -> Option<u128> {
        u128::try_from(self.0).ok()
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Magnitude of the raw value
    #[inline]
    pub const fn unsigned_abs(self) -> u128 {
        self.0.unsigned_abs()
    }

    /// Integer part, truncated toward zero
    #[inline]
    pub const fn trunc(self) -> i128 {
        self.0 / WAD
    }

    /// Fractional part, carrying the sign of `self`
    #[inline]
    pub const fn fract(self) -> Fixed {
        Fixed(self.0 % WAD)
    }

    // ========================================================================
    // Checked arithmetic
    // ========================================================================

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_neg(self) -> Option<Self> {
        self.0.checked_neg().map(Self)
    }

    /// Multiply, truncating the magnitude of the result toward zero
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        let magnitude = mul_div(self.unsigned_abs(), rhs.unsigned_abs(), WAD as u128)?;
        Self::with_sign(magnitude, self.is_negative() != rhs.is_negative())
    }

    /// Divide, truncating the magnitude of the result toward zero
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        let magnitude = mul_div(self.unsigned_abs(), WAD as u128, rhs.unsigned_abs())?;
        Self::with_sign(magnitude, self.is_negative() != rhs.is_negative())
    }

    /// Multiply the raw value by a plain integer
    pub fn checked_mul_int(self, rhs: i128) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    /// Divide the raw value by a plain integer, truncating toward zero
    pub fn checked_div_int(self, rhs: i128) -> Option<Self> {
        self.0.checked_div(rhs).map(Self)
    }

    fn with_sign(magnitude: u128, negative: bool) -> Option<Self> {
        let value = i128::try_from(magnitude).ok()?;
        Some(Self(if negative { -value } else { value }))
    }

    // ========================================================================
    // Result-returning arithmetic (for `?` inside the kernel)
    // ========================================================================

    pub fn try_add(self, rhs: Self) -> Result<Self, MathError> {
        self.checked_add(rhs).ok_or(MathError::Overflow)
    }

    pub fn try_sub(self, rhs: Self) -> Result<Self, MathError> {
        self.checked_sub(rhs).ok_or(MathError::Overflow)
    }

    pub fn try_mul(self, rhs: Self) -> Result<Self, MathError> {
        self.checked_mul(rhs).ok_or(MathError::Overflow)
    }

    pub fn try_div(self, rhs: Self) -> Result<Self, MathError> {
        if rhs.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        self.checked_div(rhs).ok_or(MathError::Overflow)
    }

    // ========================================================================
    // Decimal conversion
    // ========================================================================

    /// Exact decimal representation, if it fits in a `Decimal` mantissa
    pub fn to_decimal(self) -> Option<Decimal> {
        Decimal::try_from_i128_with_scale(self.0, DECIMALS).ok()
    }

    /// Convert a `Decimal`, truncating digits beyond the 18th
    pub fn from_decimal(d: Decimal) -> Option<Self> {
        let mantissa = d.mantissa();
        let scale = d.scale();
        let raw = if scale <= DECIMALS {
            mantissa.checked_mul(10i128.checked_pow(DECIMALS - scale)?)?
        } else {
            mantissa / 10i128.checked_pow(scale - DECIMALS)?
        };
        Some(Self(raw))
    }
}

impl FromStr for Fixed {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim()).map_err(|_| MathError::Parse)?;
        Self::from_decimal(decimal).ok_or(MathError::Overflow)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Some(decimal) => write!(f, "{}", decimal.normalize()),
            None => {
                // Beyond 28 significant digits: print the raw parts
                let sign = if self.is_negative() { "-" } else { "" };
                let magnitude = self.unsigned_abs();
                let wad = WAD as u128;
                write!(f, "{}{}.{:018}", sign, magnitude / wad, magnitude % wad)
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
