//! Host notification channel payloads.
//!
//! One typed broadcast channel replaces ad-hoc callback wiring; hosts
//! subscribe through the `EngineHandle`. Lagging subscribers miss
//! events rather than blocking the loop.

use chrono::{DateTime, Utc};
use vigil_core::{Price, Quote, RejectReason, Symbol};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SignalRejected {
        symbol: Symbol,
        strategy: String,
        reason: RejectReason,
    },
    IntentDropped {
        symbol: Symbol,
    },
    PositionOpened {
        symbol: Symbol,
        entry_price: Price,
        notional: Quote,
    },
    PositionClosed {
        symbol: Symbol,
        realized_pnl: Quote,
    },
    SubmissionFailed {
        symbol: Symbol,
        reason: String,
    },
    BreakerTripped {
        reason: String,
        at: DateTime<Utc>,
    },
    BreakerRearmed {
        at: DateTime<Utc>,
    },
    SettingsUpdated,
    TickCompleted {
        tick: u64,
    },
}
