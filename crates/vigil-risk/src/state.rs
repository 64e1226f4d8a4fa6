//! Rolling risk state.

use crate::config::{RiskLimits, RiskWeights};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use vigil_core::Quote;

/// Per-factor risk scores, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorScores {
    /// Ledger utilization: open positions / max active positions.
    pub portfolio: Decimal,
    /// Market-wide stress, averaged over the watchlist.
    pub market: Decimal,
    /// Average realized volatility over the watchlist.
    pub volatility: Decimal,
    /// Average correlation to existing holdings.
    pub correlation: Decimal,
    /// Thinness: how close watchlist liquidity sits to the minimum.
    pub liquidity: Decimal,
}

impl RiskFactorScores {
    /// Weighted composite score in [0, 1].
    pub fn composite(&self, weights: &RiskWeights) -> Decimal {
        self.portfolio * weights.portfolio
            + self.market * weights.market
            + self.volatility * weights.volatility
            + self.correlation * weights.correlation
            + self.liquidity * weights.liquidity
    }
}

/// Accumulated risk bookkeeping, owned by the engine.
///
/// Daily realized PnL resets on a rolling 24h window measured from the
/// last reset, not from calendar midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskState {
    pub daily_realized_pnl: Quote,
    pub window_started_at: DateTime<Utc>,
    pub consecutive_losses: u32,
    pub last_loss_at: Option<DateTime<Utc>>,
    pub factor_scores: RiskFactorScores,
}

impl RiskState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            daily_realized_pnl: Quote::new(Decimal::ZERO),
            window_started_at: now,
            consecutive_losses: 0,
            last_loss_at: None,
            factor_scores: RiskFactorScores::default(),
        }
    }

    /// Reset the daily PnL once 24h have elapsed since the last reset.
    pub fn maybe_roll_window(&mut self, now: DateTime<Utc>) {
        if now - self.window_started_at >= Duration::hours(24) {
            info!(
                previous_pnl = %self.daily_realized_pnl,
                "daily pnl window rolled"
            );
            self.daily_realized_pnl = Quote::new(Decimal::ZERO);
            self.window_started_at = now;
        }
    }

    /// Fold a confirmed close into daily PnL and the loss streak.
    pub fn record_close(&mut self, realized_pnl: Quote, now: DateTime<Utc>) {
        self.daily_realized_pnl = self.daily_realized_pnl + realized_pnl;
        if realized_pnl.is_negative() {
            self.consecutive_losses += 1;
            self.last_loss_at = Some(now);
        } else {
            self.consecutive_losses = 0;
        }
    }

    /// Whether new entries are blocked by the post-loss cooldown.
    pub fn in_loss_cooldown(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        match self.last_loss_at {
            Some(at) => now - at < cooldown,
            None => false,
        }
    }

    /// Whether the daily realized loss limit has been reached.
    pub fn daily_loss_breached(&self, limits: &RiskLimits) -> bool {
        self.daily_realized_pnl <= limits.daily_loss_floor()
    }

    pub fn composite_score(&self, weights: &RiskWeights) -> Decimal {
        self.factor_scores.composite(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(v: Decimal) -> Quote {
        Quote::new(v)
    }

    #[test]
    fn test_record_close_tracks_streak() {
        let now = Utc::now();
        let mut state = RiskState::new(now);

        state.record_close(quote(dec!(-50)), now);
        state.record_close(quote(dec!(-30)), now);
        assert_eq!(state.consecutive_losses, 2);
        assert_eq!(state.daily_realized_pnl, quote(dec!(-80)));

        state.record_close(quote(dec!(100)), now);
        assert_eq!(state.consecutive_losses, 0);
        assert_eq!(state.daily_realized_pnl, quote(dec!(20)));
        assert!(state.last_loss_at.is_some());
    }

    #[test]
    fn test_window_rolls_after_24h() {
        let start = Utc::now();
        let mut state = RiskState::new(start);
        state.record_close(quote(dec!(-500)), start);

        state.maybe_roll_window(start + Duration::hours(23));
        assert_eq!(state.daily_realized_pnl, quote(dec!(-500)));

        state.maybe_roll_window(start + Duration::hours(24));
        assert_eq!(state.daily_realized_pnl, quote(dec!(0)));
        assert_eq!(state.window_started_at, start + Duration::hours(24));
    }

    #[test]
    fn test_loss_cooldown_window() {
        let now = Utc::now();
        let mut state = RiskState::new(now);
        state.record_close(quote(dec!(-10)), now);

        let cooldown = Duration::seconds(300);
        assert!(state.in_loss_cooldown(now + Duration::seconds(299), cooldown));
        assert!(!state.in_loss_cooldown(now + Duration::seconds(300), cooldown));
    }

    #[test]
    fn test_daily_loss_breach_is_inclusive() {
        let limits = RiskLimits {
            bankroll: quote(dec!(10000)),
            max_daily_loss_pct: dec!(0.10),
            ..Default::default()
        };
        let now = Utc::now();
        let mut state = RiskState::new(now);

        state.record_close(quote(dec!(-999)), now);
        assert!(!state.daily_loss_breached(&limits));

        state.record_close(quote(dec!(-1)), now);
        assert!(state.daily_loss_breached(&limits));
    }

    #[test]
    fn test_composite_is_weighted_sum() {
        let scores = RiskFactorScores {
            portfolio: dec!(1),
            market: dec!(0),
            volatility: dec!(1),
            correlation: dec!(0),
            liquidity: dec!(0),
        };
        let weights = RiskWeights::default();
        assert_eq!(scores.composite(&weights), dec!(0.55));
    }
}
