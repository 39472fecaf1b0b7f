//! Exchange coordinator.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Same call sequence always produces the same state root
//! 2. **Fixed-Point Math**: No floating-point operations on any settlement path
//! 3. **Synchronous Execution**: Every call runs to completion, no async
//! 4. **All or nothing**: A rejected call leaves no trace
//!
//! ## Call ordering
//!
//! Inside each operation: checks, then pool and vault updates, then token
//! ledger calls. A per-market guard rejects re-entry while a call on the same
//! market is in progress.

pub mod exchange;
pub mod guard;

pub use exchange::Exchange;
pub use guard::MarketLocks;
