//! Strategy configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for the momentum (SMA crossover) strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    /// Short moving-average window in ticks.
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    /// Long moving-average window in ticks.
    #[serde(default = "default_long_window")]
    pub long_window: usize,
    /// Minimum relative separation between the averages to signal.
    #[serde(default = "default_min_separation")]
    pub min_separation: Decimal,
    /// Separation at which signal strength saturates to 1.0.
    #[serde(default = "default_full_separation")]
    pub full_separation: Decimal,
}

fn default_short_window() -> usize {
    5
}

fn default_long_window() -> usize {
    20
}

fn default_min_separation() -> Decimal {
    Decimal::new(2, 3) // 0.002
}

fn default_full_separation() -> Decimal {
    Decimal::new(2, 2) // 0.02
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            short_window: default_short_window(),
            long_window: default_long_window(),
            min_separation: default_min_separation(),
            full_separation: default_full_separation(),
        }
    }
}

impl MomentumConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.short_window == 0 {
            return Err("short_window must be positive".to_string());
        }
        if self.short_window >= self.long_window {
            return Err(format!(
                "short_window ({}) must be less than long_window ({})",
                self.short_window, self.long_window
            ));
        }
        if self.min_separation.is_sign_negative() {
            return Err(format!(
                "min_separation ({}) must be non-negative",
                self.min_separation
            ));
        }
        if self.full_separation <= self.min_separation {
            return Err(format!(
                "full_separation ({}) must exceed min_separation ({})",
                self.full_separation, self.min_separation
            ));
        }
        Ok(())
    }
}

/// Configuration for the mean-reversion strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanReversionConfig {
    /// Rolling mean window in ticks.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Deviation below the mean that triggers an enter.
    #[serde(default = "default_entry_deviation")]
    pub entry_deviation: Decimal,
    /// Deviation above the mean that triggers an exit.
    #[serde(default = "default_exit_deviation")]
    pub exit_deviation: Decimal,
    /// Deviation at which signal strength saturates to 1.0.
    #[serde(default = "default_full_deviation")]
    pub full_deviation: Decimal,
}

fn default_window() -> usize {
    20
}

fn default_entry_deviation() -> Decimal {
    Decimal::new(3, 2) // 0.03
}

fn default_exit_deviation() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_full_deviation() -> Decimal {
    Decimal::new(10, 2) // 0.10
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            entry_deviation: default_entry_deviation(),
            exit_deviation: default_exit_deviation(),
            full_deviation: default_full_deviation(),
        }
    }
}

impl MeanReversionConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.window < 2 {
            return Err(format!("window ({}) must be at least 2", self.window));
        }
        if !self.entry_deviation.is_sign_positive() {
            return Err(format!(
                "entry_deviation ({}) must be positive",
                self.entry_deviation
            ));
        }
        if self.full_deviation <= self.entry_deviation {
            return Err(format!(
                "full_deviation ({}) must exceed entry_deviation ({})",
                self.full_deviation, self.entry_deviation
            ));
        }
        Ok(())
    }
}

/// A named strategy selection from the application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySpec {
    Momentum(MomentumConfig),
    MeanReversion(MeanReversionConfig),
}

impl StrategySpec {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Momentum(cfg) => cfg.validate(),
            Self::MeanReversion(cfg) => cfg.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(MomentumConfig::default().validate().is_ok());
        assert!(MeanReversionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_momentum_rejects_inverted_windows() {
        let cfg = MomentumConfig {
            short_window: 20,
            long_window: 5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_mean_reversion_rejects_tiny_window() {
        let cfg = MeanReversionConfig {
            window: 1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
