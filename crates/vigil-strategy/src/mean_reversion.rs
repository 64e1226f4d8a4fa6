//! Mean-reversion strategy: deviation from a rolling mean.
//!
//! Recommends entering when price has fallen `entry_deviation` or more
//! below its rolling mean, and exiting once price recovers to
//! `exit_deviation` above it.

use crate::config::MeanReversionConfig;
use crate::provider::SignalProvider;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use vigil_core::{Direction, IndicatorValue, MarketSnapshot, Signal, Symbol};

pub struct MeanReversionStrategy {
    config: MeanReversionConfig,
    windows: HashMap<Symbol, VecDeque<Decimal>>,
}

impl MeanReversionStrategy {
    pub fn new(config: MeanReversionConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
        }
    }

    fn strength_for(&self, deviation: Decimal) -> Decimal {
        (deviation / self.config.full_deviation).min(Decimal::ONE)
    }
}

impl SignalProvider for MeanReversionStrategy {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Vec<Signal> {
        let mut signals = Vec::new();

        for (symbol, asset) in &snapshot.assets {
            let window = self.windows.entry(symbol.clone()).or_default();
            window.push_back(asset.price.inner());
            while window.len() > self.config.window {
                window.pop_front();
            }
            if window.len() < self.config.window {
                continue;
            }

            let sum: Decimal = window.iter().sum();
            let mean = sum / Decimal::from(window.len() as u64);
            if mean.is_zero() {
                continue;
            }
            let deviation = (asset.price.inner() - mean) / mean;

            let direction = if deviation <= -self.config.entry_deviation {
                Direction::EnterLong
            } else if deviation >= self.config.exit_deviation {
                Direction::Exit
            } else {
                continue;
            };

            signals.push(Signal::new(
                symbol.clone(),
                direction,
                self.strength_for(deviation.abs()),
                vec![
                    IndicatorValue::new("rolling_mean", mean),
                    IndicatorValue::new("deviation", deviation),
                ],
                self.name(),
            ));
        }

        signals
    }
}
