//! Open positions and closed-trade records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vigil_core::{Fill, Price, Quote, Size, Symbol};

/// An open, tracked holding with defined exit thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    /// Price the entry fill executed at.
    pub entry_price: Price,
    /// Held quantity in base units.
    pub units: Size,
    /// Entry notional in quote currency.
    pub notional: Quote,
    /// Exit threshold on the downside, negative (e.g. -0.10).
    pub stop_loss_pct: Decimal,
    /// Exit threshold on the upside, positive (e.g. 0.20).
    pub take_profit_pct: Decimal,
    pub opened_at: DateTime<Utc>,
    /// Strategy whose signal opened this position.
    pub strategy: String,
    /// Set once an exit intent has been queued; cleared if the exit
    /// submission fails so the next monitoring pass re-queues it.
    pub exit_pending: bool,
}

impl Position {
    /// Build a position from a confirmed entry fill.
    pub fn from_fill(
        symbol: Symbol,
        fill: &Fill,
        stop_loss_pct: Decimal,
        take_profit_pct: Decimal,
        strategy: impl Into<String>,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            entry_price: fill.executed_price,
            units: fill.executed_size,
            notional: fill.executed_size.notional(fill.executed_price),
            stop_loss_pct,
            take_profit_pct,
            opened_at,
            strategy: strategy.into(),
            exit_pending: false,
        }
    }

    /// Unrealized return at `current`, None if the entry price is zero.
    pub fn unrealized_return(&self, current: Price) -> Option<Decimal> {
        current.return_from(self.entry_price)
    }

    /// Which exit threshold, if any, `current` breaches.
    pub fn exit_trigger(&self, current: Price) -> Option<ExitTrigger> {
        let ret = self.unrealized_return(current)?;
        if ret >= self.take_profit_pct {
            Some(ExitTrigger::TakeProfit)
        } else if ret <= self.stop_loss_pct {
            Some(ExitTrigger::StopLoss)
        } else {
            None
        }
    }
}

/// Which threshold fired during a monitoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitTrigger {
    StopLoss,
    TakeProfit,
}

/// Request to close a position, produced by the monitoring pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitRequest {
    pub symbol: Symbol,
    pub current_price: Price,
    pub unrealized_return: Decimal,
    pub trigger: ExitTrigger,
    /// Notional to close, at `current_price`.
    pub size: Quote,
}

/// A position removed from the ledger by a confirmed exit fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub symbol: Symbol,
    pub entry_price: Price,
    pub exit_price: Price,
    pub units: Size,
    /// `exit_price * units - entry_price * units`, quote currency.
    pub realized_pnl: Quote,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub strategy: String,
}

impl ClosedTrade {
    pub fn is_loss(&self) -> bool {
        self.realized_pnl.is_negative()
    }
}
