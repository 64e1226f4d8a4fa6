//! Risk limit configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vigil_core::Quote;

/// Weights for the composite risk score. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub portfolio: Decimal,
    pub market: Decimal,
    pub volatility: Decimal,
    pub correlation: Decimal,
    pub liquidity: Decimal,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            portfolio: Decimal::new(30, 2),   // 0.30
            market: Decimal::new(20, 2),      // 0.20
            volatility: Decimal::new(25, 2),  // 0.25
            correlation: Decimal::new(10, 2), // 0.10
            liquidity: Decimal::new(15, 2),   // 0.15
        }
    }
}

impl RiskWeights {
    pub fn sum(&self) -> Decimal {
        self.portfolio + self.market + self.volatility + self.correlation + self.liquidity
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sum() != Decimal::ONE {
            return Err(format!("risk weights must sum to 1, got {}", self.sum()));
        }
        for (name, w) in [
            ("portfolio", self.portfolio),
            ("market", self.market),
            ("volatility", self.volatility),
            ("correlation", self.correlation),
            ("liquidity", self.liquidity),
        ] {
            if w.is_sign_negative() {
                return Err(format!("risk weight {} ({}) must be non-negative", name, w));
            }
        }
        Ok(())
    }
}

/// All pre-trade limits and breaker thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Capital base against which the daily loss limit is measured.
    #[serde(default = "default_bankroll")]
    pub bankroll: Quote,
    /// Configured per-trade notional before scaling.
    #[serde(default = "default_trade_size")]
    pub trade_size: Quote,
    /// Floor for any accepted trade.
    #[serde(default = "default_min_trade_size")]
    pub min_trade_size: Quote,
    /// Hard cap on any single position's notional.
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Quote,
    /// Minimum asset liquidity to trade at all.
    #[serde(default = "default_min_liquidity")]
    pub min_liquidity: Quote,
    /// Minimum 24h volume to trade at all.
    #[serde(default = "default_min_volume")]
    pub min_volume: Quote,
    /// Daily realized loss, as a fraction of bankroll, that halts entries.
    #[serde(default = "default_max_daily_loss_pct")]
    pub max_daily_loss_pct: Decimal,
    /// Maximum tolerated price impact of a single trade.
    #[serde(default = "default_max_slippage_impact")]
    pub max_slippage_impact: Decimal,
    /// Fraction of asset liquidity usable as base size.
    #[serde(default = "default_liquidity_fraction")]
    pub liquidity_fraction: Decimal,
    /// Volatility above this scales size down by (1 - volatility).
    #[serde(default = "default_volatility_threshold")]
    pub volatility_threshold: Decimal,
    /// Correlation above this scales size down by (1 - correlation).
    #[serde(default = "default_correlation_threshold")]
    pub correlation_threshold: Decimal,
    /// Signals weaker than this are vetoed.
    #[serde(default = "default_min_signal_strength")]
    pub min_signal_strength: Decimal,
    /// Maximum simultaneously open positions.
    #[serde(default = "default_max_active_positions")]
    pub max_active_positions: usize,
    /// No new entries within this window after a realized loss.
    #[serde(default = "default_loss_cooldown_secs")]
    pub loss_cooldown_secs: u64,
    /// Loss streak length that trips the breaker.
    #[serde(default = "default_max_consecutive_losses")]
    pub max_consecutive_losses: u32,
    /// How long the breaker stays tripped before auto re-arm.
    #[serde(default = "default_breaker_cooldown_secs")]
    pub breaker_cooldown_secs: u64,
    /// Composite factor score that trips the breaker.
    #[serde(default = "default_composite_risk_threshold")]
    pub composite_risk_threshold: Decimal,
    /// Composite score weights.
    #[serde(default)]
    pub weights: RiskWeights,
}

fn default_bankroll() -> Quote {
    Quote::new(Decimal::from(10_000))
}

fn default_trade_size() -> Quote {
    Quote::new(Decimal::from(250))
}

fn default_min_trade_size() -> Quote {
    Quote::new(Decimal::from(25))
}

fn default_max_position_size() -> Quote {
    Quote::new(Decimal::from(1_000))
}

fn default_min_liquidity() -> Quote {
    Quote::new(Decimal::from(50_000))
}

fn default_min_volume() -> Quote {
    Quote::new(Decimal::from(100_000))
}

fn default_max_daily_loss_pct() -> Decimal {
    Decimal::new(10, 2) // 0.10
}

fn default_max_slippage_impact() -> Decimal {
    Decimal::new(2, 2) // 0.02
}

fn default_liquidity_fraction() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

fn default_volatility_threshold() -> Decimal {
    Decimal::new(30, 2) // 0.30
}

fn default_correlation_threshold() -> Decimal {
    Decimal::new(70, 2) // 0.70
}

fn default_min_signal_strength() -> Decimal {
    Decimal::new(50, 2) // 0.50
}

fn default_max_active_positions() -> usize {
    5
}

fn default_loss_cooldown_secs() -> u64 {
    300 // 5 minutes
}

fn default_max_consecutive_losses() -> u32 {
    3
}

fn default_breaker_cooldown_secs() -> u64 {
    3_600 // 1 hour
}

fn default_composite_risk_threshold() -> Decimal {
    Decimal::new(75, 2) // 0.75
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            bankroll: default_bankroll(),
            trade_size: default_trade_size(),
            min_trade_size: default_min_trade_size(),
            max_position_size: default_max_position_size(),
            min_liquidity: default_min_liquidity(),
            min_volume: default_min_volume(),
            max_daily_loss_pct: default_max_daily_loss_pct(),
            max_slippage_impact: default_max_slippage_impact(),
            liquidity_fraction: default_liquidity_fraction(),
            volatility_threshold: default_volatility_threshold(),
            correlation_threshold: default_correlation_threshold(),
            min_signal_strength: default_min_signal_strength(),
            max_active_positions: default_max_active_positions(),
            loss_cooldown_secs: default_loss_cooldown_secs(),
            max_consecutive_losses: default_max_consecutive_losses(),
            breaker_cooldown_secs: default_breaker_cooldown_secs(),
            composite_risk_threshold: default_composite_risk_threshold(),
            weights: RiskWeights::default(),
        }
    }
}

impl RiskLimits {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !self.bankroll.is_positive() {
            return Err(format!("bankroll ({}) must be positive", self.bankroll));
        }
        if !self.min_trade_size.is_positive() {
            return Err(format!(
                "min_trade_size ({}) must be positive",
                self.min_trade_size
            ));
        }
        if self.min_trade_size > self.max_position_size {
            return Err(format!(
                "min_trade_size ({}) must not exceed max_position_size ({})",
                self.min_trade_size, self.max_position_size
            ));
        }
        if self.trade_size < self.min_trade_size {
            return Err(format!(
                "trade_size ({}) must be at least min_trade_size ({})",
                self.trade_size, self.min_trade_size
            ));
        }
        if !pct_in_unit_range(self.max_daily_loss_pct) {
            return Err(format!(
                "max_daily_loss_pct ({}) must be in (0, 1]",
                self.max_daily_loss_pct
            ));
        }
        if !pct_in_unit_range(self.max_slippage_impact) {
            return Err(format!(
                "max_slippage_impact ({}) must be in (0, 1]",
                self.max_slippage_impact
            ));
        }
        if !pct_in_unit_range(self.liquidity_fraction) {
            return Err(format!(
                "liquidity_fraction ({}) must be in (0, 1]",
                self.liquidity_fraction
            ));
        }
        if self.min_signal_strength.is_sign_negative() || self.min_signal_strength > Decimal::ONE {
            return Err(format!(
                "min_signal_strength ({}) must be in [0, 1]",
                self.min_signal_strength
            ));
        }
        if self.max_active_positions == 0 {
            return Err("max_active_positions must be positive".to_string());
        }
        if self.max_consecutive_losses == 0 {
            return Err("max_consecutive_losses must be positive".to_string());
        }
        if !pct_in_unit_range(self.composite_risk_threshold) {
            return Err(format!(
                "composite_risk_threshold ({}) must be in (0, 1]",
                self.composite_risk_threshold
            ));
        }
        self.weights.validate()
    }

    /// Absolute daily loss that halts entries (negative Quote).
    pub fn daily_loss_floor(&self) -> Quote {
        Quote::new(-(self.bankroll.inner() * self.max_daily_loss_pct))
    }

    pub fn loss_cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.loss_cooldown_secs as i64)
    }

    pub fn breaker_cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.breaker_cooldown_secs as i64)
    }
}

fn pct_in_unit_range(value: Decimal) -> bool {
    value > Decimal::ZERO && value <= Decimal::ONE
}
