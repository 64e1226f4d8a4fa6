//! The signal provider capability.

use vigil_core::{MarketSnapshot, Signal};

/// A strategy that turns market snapshots into trade recommendations.
///
/// Implementations may keep rolling indicator state (moving averages,
/// deviation windows) across calls, but must not mutate anything outside
/// themselves. The engine calls `evaluate` once per tick with the
/// snapshot fetched for that tick, and emits at most one recommendation
/// per symbol per provider.
pub trait SignalProvider: Send {
    /// Stable strategy name used in logs, metrics and intents.
    fn name(&self) -> &str;

    /// Evaluate the snapshot and return this tick's recommendations.
    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Vec<Signal>;
}
