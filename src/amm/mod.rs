//! LMSR automated market maker.
//!
//! - [`lmsr`]: pure pricing functions over a net-sold vector
//! - [`Pool`]: per-market liquidity, LP shares and trade application

pub mod lmsr;
mod pool;

pub use pool::{Exposure, LiquidityWithdrawal, Pool, Quote};
