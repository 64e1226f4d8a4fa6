//! Momentum strategy: short/long SMA crossover.
//!
//! Recommends entering when the short average pulls above the long
//! average by more than `min_separation`, and exiting when it drops
//! below by the same margin. Strength scales linearly with separation
//! up to `full_separation`.

use crate::config::MomentumConfig;
use crate::provider::SignalProvider;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use vigil_core::{Direction, IndicatorValue, MarketSnapshot, Signal, Symbol};

/// Rolling price window for a single symbol.
#[derive(Debug, Default)]
struct PriceWindow {
    prices: VecDeque<Decimal>,
}

impl PriceWindow {
    fn push(&mut self, price: Decimal, cap: usize) {
        self.prices.push_back(price);
        while self.prices.len() > cap {
            self.prices.pop_front();
        }
    }

    /// Mean over the most recent `n` entries, None if fewer are held.
    fn sma(&self, n: usize) -> Option<Decimal> {
        if n == 0 || self.prices.len() < n {
            return None;
        }
        let sum: Decimal = self.prices.iter().rev().take(n).sum();
        Some(sum / Decimal::from(n as u64))
    }
}

pub struct MomentumStrategy {
    config: MomentumConfig,
    windows: HashMap<Symbol, PriceWindow>,
}

impl MomentumStrategy {
    pub fn new(config: MomentumConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
        }
    }

    /// Map separation to a strength in (0, 1].
    fn strength_for(&self, separation: Decimal) -> Decimal {
        (separation / self.config.full_separation).min(Decimal::ONE)
    }
}

impl SignalProvider for MomentumStrategy {
    fn name(&self) -> &str {
        "momentum"
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Vec<Signal> {
        let mut signals = Vec::new();

        // BTreeMap iteration keeps symbol order stable across ticks.
        for (symbol, asset) in &snapshot.assets {
            let window = self.windows.entry(symbol.clone()).or_default();
            window.push(asset.price.inner(), self.config.long_window);

            let (short, long) = match (
                window.sma(self.config.short_window),
                window.sma(self.config.long_window),
            ) {
                (Some(s), Some(l)) if !l.is_zero() => (s, l),
                _ => continue, // still warming up
            };

            let separation = (short - long) / long;
            let direction = if separation >= self.config.min_separation {
                Direction::EnterLong
            } else if separation <= -self.config.min_separation {
                Direction::Exit
            } else {
                continue;
            };

            let strength = self.strength_for(separation.abs());
            signals.push(Signal::new(
                symbol.clone(),
                direction,
                strength,
                vec![
                    IndicatorValue::new("sma_short", short),
                    IndicatorValue::new("sma_long", long),
                    IndicatorValue::new("separation", separation),
                ],
                self.name(),
            ));
        }

        signals
    }
}
