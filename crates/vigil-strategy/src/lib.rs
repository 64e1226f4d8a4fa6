//! Signal providers for the vigil trading engine.
//!
//! Strategies implement the `SignalProvider` trait and are selected by
//! name through the registry. Each provider may keep rolling indicator
//! state across ticks but has no side effects on shared engine state.

pub mod config;
pub mod error;
pub mod mean_reversion;
pub mod momentum;
pub mod provider;
pub mod registry;

pub use config::{MeanReversionConfig, MomentumConfig, StrategySpec};
pub use error::{StrategyError, StrategyResult};
pub use mean_reversion::MeanReversionStrategy;
pub use momentum::MomentumStrategy;
pub use provider::SignalProvider;
pub use registry::StrategySet;
