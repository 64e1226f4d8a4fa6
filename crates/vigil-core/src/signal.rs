//! Strategy signal types.

use crate::intent::Direction;
use crate::Symbol;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named indicator reading attached to a signal for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorValue {
    pub name: String,
    pub value: Decimal,
}

impl IndicatorValue {
    pub fn new(name: impl Into<String>, value: Decimal) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A strategy's recommendation to enter or exit a position.
///
/// Immutable once created. Signals with strength below the configured
/// minimum are discarded before reaching the risk gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Asset the recommendation targets.
    pub symbol: Symbol,
    /// Enter or exit.
    pub direction: Direction,
    /// Confidence in [0, 1]. Values outside the range are clamped at
    /// construction.
    pub strength: Decimal,
    /// Indicator readings that produced this signal.
    pub indicators: Vec<IndicatorValue>,
    /// Name of the originating strategy.
    pub strategy: String,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(
        symbol: Symbol,
        direction: Direction,
        strength: Decimal,
        indicators: Vec<IndicatorValue>,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            symbol,
            direction,
            strength: strength.clamp(Decimal::ZERO, Decimal::ONE),
            indicators,
            strategy: strategy.into(),
            generated_at: Utc::now(),
        }
    }

    pub fn is_enter(&self) -> bool {
        self.direction == Direction::EnterLong
    }

    pub fn is_exit(&self) -> bool {
        self.direction == Direction::Exit
    }
}
