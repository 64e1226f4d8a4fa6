//! The position ledger.
//!
//! Owned by the engine and mutated only on the tick task; at most one
//! open position per symbol at all times.

use crate::position::{ClosedTrade, ExitRequest, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};
use vigil_core::{Fill, MarketSnapshot, Symbol};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PositionLedger {
    positions: HashMap<Symbol, Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a position from a confirmed entry fill.
    ///
    /// No-op if a position for the symbol already exists.
    pub fn open(&mut self, position: Position) {
        if self.positions.contains_key(&position.symbol) {
            warn!(symbol = %position.symbol, "position already open, ignoring duplicate entry");
            return;
        }
        info!(
            symbol = %position.symbol,
            entry_price = %position.entry_price,
            notional = %position.notional,
            strategy = %position.strategy,
            "position opened"
        );
        self.positions.insert(position.symbol.clone(), position);
    }

    /// Check every position against this tick's prices and collect exit
    /// requests.
    ///
    /// Exactly one request per breached position; positions already
    /// queued for exit are skipped until their close is confirmed.
    /// Symbols missing from the snapshot are skipped for this pass.
    pub fn monitor(&self, snapshot: &MarketSnapshot) -> Vec<ExitRequest> {
        let mut requests = Vec::new();
        for position in self.positions.values() {
            if position.exit_pending {
                continue;
            }
            let Some(current) = snapshot.price(&position.symbol) else {
                warn!(symbol = %position.symbol, "no price this tick, skipping monitor check");
                continue;
            };
            let Some(trigger) = position.exit_trigger(current) else {
                continue;
            };
            // Entry price is non-zero for any open position, so the
            // return is always computable here.
            let Some(ret) = position.unrealized_return(current) else {
                continue;
            };
            requests.push(ExitRequest {
                symbol: position.symbol.clone(),
                current_price: current,
                unrealized_return: ret,
                trigger,
                size: position.units.notional(current),
            });
        }
        requests.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        requests
    }

    /// Remove a position on a confirmed exit fill and compute realized
    /// PnL.
    ///
    /// Closing a symbol with no open position is a no-op returning None.
    pub fn close(
        &mut self,
        symbol: &Symbol,
        fill: &Fill,
        closed_at: DateTime<Utc>,
    ) -> Option<ClosedTrade> {
        let position = self.positions.remove(symbol)?;
        let exit_notional = position.units.notional(fill.executed_price);
        let realized_pnl = exit_notional - position.notional;
        info!(
            symbol = %symbol,
            entry_price = %position.entry_price,
            exit_price = %fill.executed_price,
            realized_pnl = %realized_pnl,
            "position closed"
        );
        Some(ClosedTrade {
            symbol: symbol.clone(),
            entry_price: position.entry_price,
            exit_price: fill.executed_price,
            units: position.units,
            realized_pnl,
            opened_at: position.opened_at,
            closed_at,
            strategy: position.strategy,
        })
    }

    /// Flag a position as having an exit queued.
    pub fn mark_exit_pending(&mut self, symbol: &Symbol) {
        if let Some(position) = self.positions.get_mut(symbol) {
            position.exit_pending = true;
        }
    }

    /// Clear the exit flag so the next monitoring pass re-queues it.
    pub fn clear_exit_pending(&mut self, symbol: &Symbol) {
        if let Some(position) = self.positions.get_mut(symbol) {
            position.exit_pending = false;
        }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Open positions sorted by symbol, for state reporting.
    pub fn snapshot(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.positions.values().cloned().collect();
        positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        positions
    }

    /// Restore from a persisted snapshot.
    pub fn restore(positions: Vec<Position>) -> Self {
        Self {
            positions: positions
                .into_iter()
                .map(|p| (p.symbol.clone(), p))
                .collect(),
        }
    }
}
