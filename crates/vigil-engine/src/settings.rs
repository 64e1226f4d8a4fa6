//! Runtime engine settings.
//!
//! The whole settings block is swapped atomically by `update_settings`;
//! validation happens before the swap so an invalid update leaves the
//! previous configuration in place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vigil_core::Symbol;
use vigil_risk::RiskLimits;
use vigil_venue::RetryPolicy;

/// Whether the engine actually trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Full loop, but enter signals are discarded before queueing.
    Observation,
    /// Live pipeline.
    Trading,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_mode")]
    pub mode: OperatingMode,
    /// Assets the engine watches and trades.
    #[serde(default)]
    pub watchlist: Vec<Symbol>,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
    /// Exit threshold on the downside, negative.
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: Decimal,
    /// Exit threshold on the upside, positive.
    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: Decimal,
    #[serde(default)]
    pub limits: RiskLimits,
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Persist a snapshot every N ticks; 0 disables persistence.
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
}

fn default_mode() -> OperatingMode {
    OperatingMode::Observation
}

fn default_tick_interval_ms() -> u64 {
    5_000
}

fn default_max_queue_size() -> usize {
    32
}

fn default_stop_loss_pct() -> Decimal {
    Decimal::new(-10, 2) // -0.10
}

fn default_take_profit_pct() -> Decimal {
    Decimal::new(20, 2) // 0.20
}

fn default_snapshot_interval_ticks() -> u64 {
    12
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            watchlist: Vec::new(),
            tick_interval_ms: default_tick_interval_ms(),
            max_queue_size: default_max_queue_size(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
            limits: RiskLimits::default(),
            retry: RetryPolicy::default(),
            snapshot_interval_ticks: default_snapshot_interval_ticks(),
        }
    }
}

impl EngineSettings {
    /// Validate the whole block. Invalid values are reported, never
    /// silently clamped.
    pub fn validate(&self) -> Result<(), String> {
        if self.watchlist.is_empty() {
            return Err("watchlist must not be empty".to_string());
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be positive".to_string());
        }
        if self.max_queue_size == 0 {
            return Err("max_queue_size must be positive".to_string());
        }
        if !self.stop_loss_pct.is_sign_negative() || self.stop_loss_pct <= Decimal::NEGATIVE_ONE {
            return Err(format!(
                "stop_loss_pct ({}) must be in (-1, 0)",
                self.stop_loss_pct
            ));
        }
        if self.take_profit_pct <= Decimal::ZERO {
            return Err(format!(
                "take_profit_pct ({}) must be positive",
                self.take_profit_pct
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be positive".to_string());
        }
        self.limits.validate()
    }
}
