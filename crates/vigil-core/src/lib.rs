//! Core domain types for the vigil trading engine.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Symbol`: Unique identifier for tradable assets
//! - `Price`, `Size`, `Quote`: Precision-safe numeric types
//! - `Signal`, `TradeIntent`, `Fill`: The decision pipeline's data model
//! - `AssetSnapshot`, `MarketSnapshot`: Per-tick market data

pub mod decimal;
pub mod intent;
pub mod signal;
pub mod snapshot;
pub mod symbol;

pub use decimal::{Price, Quote, Size};
pub use intent::{Direction, Fill, IntentId, RejectReason, TradeIntent};
pub use signal::{IndicatorValue, Signal};
pub use snapshot::{AssetSnapshot, MarketSnapshot};
pub use symbol::Symbol;
