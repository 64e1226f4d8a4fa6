//! Strategy registry and deterministic signal merge.

use crate::config::StrategySpec;
use crate::error::{StrategyError, StrategyResult};
use crate::mean_reversion::MeanReversionStrategy;
use crate::momentum::MomentumStrategy;
use crate::provider::SignalProvider;
use tracing::debug;
use vigil_core::{MarketSnapshot, Signal};

/// An ordered set of strategies evaluated together each tick.
///
/// Merge order is deterministic: providers run in registration order and
/// each provider's output is sorted by symbol, so the risk gate sees the
/// same candidate sequence for the same snapshot.
pub struct StrategySet {
    providers: Vec<Box<dyn SignalProvider>>,
}

impl StrategySet {
    /// Wrap already-built providers, preserving their order.
    pub fn new(providers: Vec<Box<dyn SignalProvider>>) -> Self {
        Self { providers }
    }

    /// Build the set from config specs, preserving their order.
    pub fn from_specs(specs: &[StrategySpec]) -> StrategyResult<Self> {
        let mut providers: Vec<Box<dyn SignalProvider>> = Vec::with_capacity(specs.len());
        for spec in specs {
            spec.validate().map_err(StrategyError::InvalidConfig)?;
            providers.push(match spec {
                StrategySpec::Momentum(cfg) => Box::new(MomentumStrategy::new(cfg.clone())),
                StrategySpec::MeanReversion(cfg) => {
                    Box::new(MeanReversionStrategy::new(cfg.clone()))
                }
            });
        }
        Ok(Self { providers })
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Evaluate all providers and merge their signals deterministically.
    pub fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Vec<Signal> {
        let mut merged = Vec::new();
        for provider in &mut self.providers {
            let mut signals = provider.evaluate(snapshot);
            signals.sort_by(|a, b| a.symbol.cmp(&b.symbol));
            debug!(
                strategy = provider.name(),
                count = signals.len(),
                "strategy evaluated"
            );
            merged.extend(signals);
        }
        merged
    }
}
