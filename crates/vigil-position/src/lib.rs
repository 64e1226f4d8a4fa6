//! Position tracking for the vigil trading engine.
//!
//! The ledger holds at most one open position per symbol, monitors
//! unrealized returns against exit thresholds, and computes realized
//! PnL on close.

pub mod ledger;
pub mod position;

pub use ledger::PositionLedger;
pub use position::{ClosedTrade, ExitRequest, ExitTrigger, Position};
