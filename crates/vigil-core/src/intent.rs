//! Trade intents and execution results.
//!
//! A `TradeIntent` is a sized, risk-approved order awaiting submission.
//! Intents are created only by the risk gate (enter) or the position
//! monitor (exit) and consumed exactly once by the execution loop.

use crate::{Price, Quote, Size, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Trade direction.
///
/// The engine is long-only: strategies recommend entering a long
/// position or exiting an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Open (or recommend opening) a long position.
    EnterLong,
    /// Close an existing position.
    Exit,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnterLong => write!(f, "enter_long"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

/// Unique intent identifier for tracking through the queue and venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(pub Uuid);

impl IntentId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sized, risk-approved order awaiting submission.
///
/// Invariant: `0 < size <= max_position_size` (enforced by the risk
/// gate at creation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    /// Unique identifier.
    pub id: IntentId,
    /// Target asset.
    pub symbol: Symbol,
    /// Enter or exit.
    pub direction: Direction,
    /// Requested size in quote currency.
    pub size: Quote,
    /// Reference price at decision time.
    pub reference_price: Price,
    /// Originating strategy name ("monitor" for threshold exits).
    pub strategy: String,
    /// When the intent was created.
    pub enqueued_at: DateTime<Utc>,
}

impl TradeIntent {
    pub fn new(
        symbol: Symbol,
        direction: Direction,
        size: Quote,
        reference_price: Price,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            id: IntentId::new(),
            symbol,
            direction,
            size,
            reference_price,
            strategy: strategy.into(),
            enqueued_at: Utc::now(),
        }
    }
}

/// Confirmed execution from the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Price the venue executed at.
    pub executed_price: Price,
    /// Executed quantity in base units.
    pub executed_size: Size,
    /// Venue-assigned execution identifier.
    pub venue_id: String,
}

/// Reason a candidate signal was vetoed by the risk gate.
///
/// A rejection is a normal control-flow outcome, not an error; it is
/// recorded for observability and never propagated as `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Circuit breaker is tripped; no new entries.
    BreakerTripped,
    /// Asset liquidity below the configured minimum.
    InsufficientLiquidity,
    /// 24h volume below the configured minimum.
    InsufficientVolume,
    /// Within the post-loss cooldown window.
    LossCooldown,
    /// Daily realized loss limit reached.
    DailyLossLimit,
    /// Maximum number of open positions reached.
    MaxPositionsReached,
    /// Signal strength below the configured minimum.
    WeakSignal,
    /// Even the minimum trade size exceeds the slippage impact bound.
    ExcessiveImpact,
    /// Exit signal for an asset with no open position.
    NoOpenPosition,
    /// Exit signal for a position that already has an exit queued.
    ExitAlreadyPending,
    /// Enter signal for an asset that already has an open position.
    PositionAlreadyOpen,
}

impl RejectReason {
    /// Stable label for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BreakerTripped => "breaker_tripped",
            Self::InsufficientLiquidity => "insufficient_liquidity",
            Self::InsufficientVolume => "insufficient_volume",
            Self::LossCooldown => "loss_cooldown",
            Self::DailyLossLimit => "daily_loss_limit",
            Self::MaxPositionsReached => "max_positions_reached",
            Self::WeakSignal => "weak_signal",
            Self::ExcessiveImpact => "excessive_impact",
            Self::NoOpenPosition => "no_open_position",
            Self::ExitAlreadyPending => "exit_already_pending",
            Self::PositionAlreadyOpen => "position_already_open",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BreakerTripped => write!(f, "circuit breaker tripped"),
            Self::InsufficientLiquidity => write!(f, "insufficient liquidity"),
            Self::InsufficientVolume => write!(f, "insufficient volume"),
            Self::LossCooldown => write!(f, "loss cooldown active"),
            Self::DailyLossLimit => write!(f, "daily loss limit reached"),
            Self::MaxPositionsReached => write!(f, "max active positions reached"),
            Self::WeakSignal => write!(f, "signal strength below minimum"),
            Self::ExcessiveImpact => write!(f, "price impact exceeds maximum"),
            Self::NoOpenPosition => write!(f, "no open position for exit"),
            Self::ExitAlreadyPending => write!(f, "exit already queued"),
            Self::PositionAlreadyOpen => write!(f, "position already open"),
        }
    }
}
