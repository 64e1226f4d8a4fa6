//! Per-tick market data snapshots.
//!
//! The engine fetches one `MarketSnapshot` per tick and every component
//! (strategies, risk gate, position monitoring) reads that single
//! snapshot, so all decisions within a tick see consistent prices.

use crate::{Price, Quote, Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Market data for a single asset at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    /// Asset identifier.
    pub symbol: Symbol,
    /// Last traded / reference price.
    pub price: Price,
    /// Trailing 24h traded volume in quote currency.
    pub volume_24h: Quote,
    /// Available liquidity in quote currency.
    pub liquidity: Quote,
    /// Realized volatility, normalized to [0, 1].
    pub volatility: Decimal,
    /// Correlation of returns against current holdings, in [0, 1].
    pub correlation: Decimal,
}

impl AssetSnapshot {
    /// Estimated price impact of executing `size` against available
    /// liquidity, as a fraction (0.01 = 1%).
    ///
    /// Returns `None` when liquidity is unknown or zero.
    pub fn price_impact(&self, size: Quote) -> Option<Decimal> {
        if !self.liquidity.is_positive() {
            return None;
        }
        Some(size.inner() / self.liquidity.inner())
    }
}

/// Combined market snapshot for the watchlist.
///
/// Keyed by symbol in a `BTreeMap` so iteration order is deterministic,
/// which keeps signal merging and risk evaluation reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Per-asset snapshots.
    pub assets: BTreeMap<Symbol, AssetSnapshot>,
    /// When this snapshot was taken.
    pub fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn new(assets: BTreeMap<Symbol, AssetSnapshot>, fetched_at: DateTime<Utc>) -> Self {
        Self { assets, fetched_at }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&AssetSnapshot> {
        self.assets.get(symbol)
    }

    pub fn price(&self, symbol: &Symbol) -> Option<Price> {
        self.assets.get(symbol).map(|a| a.price)
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }
}

impl FromIterator<AssetSnapshot> for MarketSnapshot {
    fn from_iter<I: IntoIterator<Item = AssetSnapshot>>(iter: I) -> Self {
        let assets = iter
            .into_iter()
            .map(|a| (a.symbol.clone(), a))
            .collect::<BTreeMap<_, _>>();
        Self::new(assets, Utc::now())
    }
}
