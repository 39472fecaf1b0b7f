//! Deterministic numerics: 256-bit intermediates and the `exp`/`ln` kernel.

pub mod kernel;
pub mod wide;

pub use kernel::{exp, ln};

/// Arithmetic failures inside the fixed-point kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("fixed-point overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("logarithm of a non-positive value")]
    LnDomain,

    #[error("invalid decimal literal")]
    Parse,
}
