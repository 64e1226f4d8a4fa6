//! Pre-trade risk gate.
//!
//! Checks run in a fixed order and the first failing check wins. A
//! rejection is a normal outcome carried in the `Verdict`, never an
//! error.

use crate::breaker::{CircuitBreaker, TripReason};
use crate::config::RiskLimits;
use crate::state::RiskState;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use vigil_core::{AssetSnapshot, Direction, Quote, RejectReason, Signal, TradeIntent};
use vigil_position::PositionLedger;

/// Outcome of gate evaluation for a single signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted(TradeIntent),
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Rejected(reason) => Some(*reason),
            Self::Accepted(_) => None,
        }
    }
}

pub struct RiskGate {
    limits: RiskLimits,
}

impl RiskGate {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Swap in new limits (already validated by the caller).
    pub fn set_limits(&mut self, limits: RiskLimits) {
        self.limits = limits;
    }

    /// Evaluate one signal against the current risk posture.
    ///
    /// Enter signals go through the ordered checks and sizing; exit
    /// signals bypass entry checks (the breaker never blocks an exit)
    /// and are sized to the full open position.
    pub fn evaluate(
        &self,
        signal: &Signal,
        risk_state: &RiskState,
        ledger: &PositionLedger,
        asset: &AssetSnapshot,
        breaker: &CircuitBreaker,
        now: DateTime<Utc>,
    ) -> Verdict {
        let verdict = match signal.direction {
            Direction::EnterLong => {
                self.evaluate_enter(signal, risk_state, ledger, asset, breaker, now)
            }
            Direction::Exit => self.evaluate_exit(signal, ledger, asset),
        };
        if let Verdict::Rejected(reason) = &verdict {
            debug!(
                symbol = %signal.symbol,
                strategy = %signal.strategy,
                %reason,
                "signal rejected"
            );
        }
        verdict
    }

    fn evaluate_enter(
        &self,
        signal: &Signal,
        risk_state: &RiskState,
        ledger: &PositionLedger,
        asset: &AssetSnapshot,
        breaker: &CircuitBreaker,
        now: DateTime<Utc>,
    ) -> Verdict {
        // 1. Breaker blocks all new entries.
        if breaker.is_tripped(now, self.limits.breaker_cooldown()) {
            return Verdict::Rejected(RejectReason::BreakerTripped);
        }

        // 2. Asset must be liquid and actively traded.
        if asset.liquidity < self.limits.min_liquidity {
            return Verdict::Rejected(RejectReason::InsufficientLiquidity);
        }
        if asset.volume_24h < self.limits.min_volume {
            return Verdict::Rejected(RejectReason::InsufficientVolume);
        }

        // 3. Post-loss cooldown.
        if risk_state.in_loss_cooldown(now, self.limits.loss_cooldown()) {
            return Verdict::Rejected(RejectReason::LossCooldown);
        }

        // 4. Daily loss limit. Reaching it here also trips the breaker.
        if risk_state.daily_loss_breached(&self.limits) {
            breaker.trip(
                TripReason::DailyLossLimit {
                    daily_pnl: risk_state.daily_realized_pnl,
                },
                now,
            );
            return Verdict::Rejected(RejectReason::DailyLossLimit);
        }

        // 5. Position count.
        if ledger.len() >= self.limits.max_active_positions {
            return Verdict::Rejected(RejectReason::MaxPositionsReached);
        }
        if ledger.contains(&signal.symbol) {
            return Verdict::Rejected(RejectReason::PositionAlreadyOpen);
        }

        // 6. Signal strength.
        if signal.strength < self.limits.min_signal_strength {
            return Verdict::Rejected(RejectReason::WeakSignal);
        }

        // 7. Sizing plus the price-impact bound.
        let size = match self.position_size(asset) {
            Some(size) => size,
            None => return Verdict::Rejected(RejectReason::ExcessiveImpact),
        };

        Verdict::Accepted(TradeIntent::new(
            signal.symbol.clone(),
            Direction::EnterLong,
            size,
            asset.price,
            signal.strategy.clone(),
        ))
    }

    fn evaluate_exit(&self, signal: &Signal, ledger: &PositionLedger, asset: &AssetSnapshot) -> Verdict {
        let Some(position) = ledger.get(&signal.symbol) else {
            return Verdict::Rejected(RejectReason::NoOpenPosition);
        };
        // An exit is already in the queue; a second one would close
        // against a position the first fill removes.
        if position.exit_pending {
            return Verdict::Rejected(RejectReason::ExitAlreadyPending);
        }
        Verdict::Accepted(TradeIntent::new(
            signal.symbol.clone(),
            Direction::Exit,
            position.units.notional(asset.price),
            asset.price,
            signal.strategy.clone(),
        ))
    }

    /// Deterministic position sizing.
    ///
    /// `base = min(trade_size, max_position_size, liquidity *
    /// liquidity_fraction)`, scaled down by `(1 - volatility)` and
    /// `(1 - correlation)` above their thresholds, floored at
    /// `min_trade_size`, then shrunk until price impact fits the bound.
    /// None when even the minimum size breaches the impact bound.
    fn position_size(&self, asset: &AssetSnapshot) -> Option<Quote> {
        let limits = &self.limits;
        let mut size = limits
            .trade_size
            .min(limits.max_position_size)
            .min(asset.liquidity * limits.liquidity_fraction);

        if asset.volatility > limits.volatility_threshold {
            size = size * (Decimal::ONE - asset.volatility).max(Decimal::ZERO);
        }
        if asset.correlation > limits.correlation_threshold {
            size = size * (Decimal::ONE - asset.correlation).max(Decimal::ZERO);
        }
        size = size.max(limits.min_trade_size);

        // Shrink (never bump) to the largest size within the impact
        // bound: impact = size / liquidity.
        let impact_cap = asset.liquidity * limits.max_slippage_impact;
        if size > impact_cap {
            size = impact_cap;
        }
        if size < limits.min_trade_size {
            return None;
        }
        Some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use vigil_core::{Fill, Price, Size, Symbol};
    use vigil_position::Position;

    fn asset(liquidity: Decimal, volume: Decimal) -> AssetSnapshot {
        AssetSnapshot {
            symbol: Symbol::from("SOL"),
            price: Price::new(dec!(100)),
            volume_24h: Quote::new(volume),
            liquidity: Quote::new(liquidity),
            volatility: dec!(0.10),
            correlation: dec!(0.10),
        }
    }

    fn enter_signal(strength: Decimal) -> Signal {
        Signal::new(
            Symbol::from("SOL"),
            Direction::EnterLong,
            strength,
            Vec::new(),
            "momentum",
        )
    }

    fn limits() -> RiskLimits {
        RiskLimits {
            bankroll: Quote::new(dec!(10000)),
            trade_size: Quote::new(dec!(250)),
            min_trade_size: Quote::new(dec!(25)),
            max_position_size: Quote::new(dec!(1000)),
            min_liquidity: Quote::new(dec!(50000)),
            min_volume: Quote::new(dec!(100000)),
            max_daily_loss_pct: dec!(0.10),
            max_slippage_impact: dec!(0.02),
            liquidity_fraction: dec!(0.05),
            min_signal_strength: dec!(0.5),
            max_active_positions: 2,
            loss_cooldown_secs: 300,
            ..Default::default()
        }
    }

    fn fresh(now: DateTime<Utc>) -> (RiskState, PositionLedger, CircuitBreaker) {
        let state = RiskState::new(now);
        let ledger = PositionLedger::new();
        let breaker = CircuitBreaker::new();
        (state, ledger, breaker)
    }

    #[test]
    fn test_low_liquidity_rejected() {
        let now = Utc::now();
        let gate = RiskGate::new(limits());
        let (state, ledger, breaker) = fresh(now);

        let verdict = gate.evaluate(
            &enter_signal(dec!(0.9)),
            &state,
            &ledger,
            &asset(dec!(10000), dec!(500000)),
            &breaker,
            now,
        );
        assert_eq!(
            verdict,
            Verdict::Rejected(RejectReason::InsufficientLiquidity)
        );
        assert_eq!(
            RejectReason::InsufficientLiquidity.to_string(),
            "insufficient liquidity"
        );
    }

    #[test]
    fn test_tripped_breaker_blocks_enters_only() {
        let now = Utc::now();
        let gate = RiskGate::new(limits());
        let (state, mut ledger, breaker) = fresh(now);
        breaker.trip(TripReason::LossStreak { count: 3 }, now);

        let verdict = gate.evaluate(
            &enter_signal(dec!(0.9)),
            &state,
            &ledger,
            &asset(dec!(500000), dec!(500000)),
            &breaker,
            now,
        );
        assert_eq!(verdict, Verdict::Rejected(RejectReason::BreakerTripped));

        // Exits still pass.
        ledger.open(Position::from_fill(
            Symbol::from("SOL"),
            &Fill {
                executed_price: Price::new(dec!(100)),
                executed_size: Size::new(dec!(5)),
                venue_id: "paper-1".to_string(),
            },
            dec!(-0.10),
            dec!(0.20),
            "momentum",
            now,
        ));
        let exit = Signal::new(
            Symbol::from("SOL"),
            Direction::Exit,
            dec!(0.9),
            Vec::new(),
            "momentum",
        );
        let verdict = gate.evaluate(
            &exit,
            &state,
            &ledger,
            &asset(dec!(500000), dec!(500000)),
            &breaker,
            now,
        );
        assert!(verdict.is_accepted());
    }

    #[test]
    fn test_daily_loss_limit_rejects_and_trips() {
        let now = Utc::now();
        let gate = RiskGate::new(limits());
        let (mut state, ledger, breaker) = fresh(now);
        // Cumulative -10% of a 10k bankroll.
        state.record_close(Quote::new(dec!(-500)), now - Duration::seconds(400));
        state.record_close(Quote::new(dec!(-500)), now - Duration::seconds(400));

        let verdict = gate.evaluate(
            &enter_signal(dec!(0.9)),
            &state,
            &ledger,
            &asset(dec!(500000), dec!(500000)),
            &breaker,
            now,
        );
        assert_eq!(verdict, Verdict::Rejected(RejectReason::DailyLossLimit));
        assert!(breaker.is_tripped(now, RiskLimits::default().breaker_cooldown()));
    }

    #[test]
    fn test_loss_cooldown_rejects() {
        let now = Utc::now();
        let gate = RiskGate::new(limits());
        let (mut state, ledger, breaker) = fresh(now);
        state.record_close(Quote::new(dec!(-10)), now - Duration::seconds(100));

        let verdict = gate.evaluate(
            &enter_signal(dec!(0.9)),
            &state,
            &ledger,
            &asset(dec!(500000), dec!(500000)),
            &breaker,
            now,
        );
        assert_eq!(verdict, Verdict::Rejected(RejectReason::LossCooldown));
    }

    #[test]
    fn test_weak_signal_rejected() {
        let now = Utc::now();
        let gate = RiskGate::new(limits());
        let (state, ledger, breaker) = fresh(now);

        let verdict = gate.evaluate(
            &enter_signal(dec!(0.3)),
            &state,
            &ledger,
            &asset(dec!(500000), dec!(500000)),
            &breaker,
            now,
        );
        assert_eq!(verdict, Verdict::Rejected(RejectReason::WeakSignal));
    }

    #[test]
    fn test_accepted_size_within_bounds() {
        let now = Utc::now();
        let gate = RiskGate::new(limits());
        let (state, ledger, breaker) = fresh(now);
        let asset = asset(dec!(500000), dec!(500000));

        let verdict = gate.evaluate(&enter_signal(dec!(0.9)), &state, &ledger, &asset, &breaker, now);
        let Verdict::Accepted(intent) = verdict else {
            panic!("expected acceptance");
        };
        assert!(intent.size.is_positive());
        assert!(intent.size <= gate.limits().max_position_size);
        let impact = asset.price_impact(intent.size).expect("liquid asset");
        assert!(impact <= gate.limits().max_slippage_impact);
    }

    #[test]
    fn test_impact_shrinks_size() {
        let now = Utc::now();
        // Liquidity barely above the minimum so the impact cap binds.
        let mut lim = limits();
        lim.min_liquidity = Quote::new(dec!(1000));
        lim.trade_size = Quote::new(dec!(250));
        let gate = RiskGate::new(lim);
        let (state, ledger, breaker) = fresh(now);
        // Base 2000 * 0.05 = 100 vs impact cap 2000 * 0.02 = 40.
        let thin = AssetSnapshot {
            liquidity: Quote::new(dec!(2000)),
            ..asset(dec!(2000), dec!(500000))
        };

        let verdict = gate.evaluate(&enter_signal(dec!(0.9)), &state, &ledger, &thin, &breaker, now);
        let Verdict::Accepted(intent) = verdict else {
            panic!("expected acceptance");
        };
        assert_eq!(intent.size, Quote::new(dec!(40)));
    }

    #[test]
    fn test_impact_below_minimum_rejects() {
        let now = Utc::now();
        let mut lim = limits();
        lim.min_liquidity = Quote::new(dec!(100));
        let gate = RiskGate::new(lim);
        let (state, ledger, breaker) = fresh(now);
        // Impact cap 500 * 0.02 = 10, below the 25 minimum.
        let thin = AssetSnapshot {
            liquidity: Quote::new(dec!(500)),
            ..asset(dec!(500), dec!(500000))
        };

        let verdict = gate.evaluate(&enter_signal(dec!(0.9)), &state, &ledger, &thin, &breaker, now);
        assert_eq!(verdict, Verdict::Rejected(RejectReason::ExcessiveImpact));
    }

    #[test]
    fn test_max_positions_rejected() {
        let now = Utc::now();
        let gate = RiskGate::new(limits());
        let (state, mut ledger, breaker) = fresh(now);
        for symbol in ["ETH", "BTC"] {
            ledger.open(Position::from_fill(
                Symbol::from(symbol),
                &Fill {
                    executed_price: Price::new(dec!(100)),
                    executed_size: Size::new(dec!(1)),
                    venue_id: "paper-1".to_string(),
                },
                dec!(-0.10),
                dec!(0.20),
                "momentum",
                now,
            ));
        }

        let verdict = gate.evaluate(
            &enter_signal(dec!(0.9)),
            &state,
            &ledger,
            &asset(dec!(500000), dec!(500000)),
            &breaker,
            now,
        );
        assert_eq!(verdict, Verdict::Rejected(RejectReason::MaxPositionsReached));
    }

    #[test]
    fn test_exit_with_pending_exit_rejected() {
        let now = Utc::now();
        let gate = RiskGate::new(limits());
        let (state, mut ledger, breaker) = fresh(now);
        ledger.open(Position::from_fill(
            Symbol::from("SOL"),
            &Fill {
                executed_price: Price::new(dec!(100)),
                executed_size: Size::new(dec!(5)),
                venue_id: "paper-1".to_string(),
            },
            dec!(-0.10),
            dec!(0.20),
            "momentum",
            now,
        ));
        ledger.mark_exit_pending(&Symbol::from("SOL"));
        let exit = Signal::new(
            Symbol::from("SOL"),
            Direction::Exit,
            dec!(0.9),
            Vec::new(),
            "momentum",
        );

        let verdict = gate.evaluate(
            &exit,
            &state,
            &ledger,
            &asset(dec!(500000), dec!(500000)),
            &breaker,
            now,
        );
        assert_eq!(verdict, Verdict::Rejected(RejectReason::ExitAlreadyPending));

        ledger.clear_exit_pending(&Symbol::from("SOL"));
        let verdict = gate.evaluate(
            &exit,
            &state,
            &ledger,
            &asset(dec!(500000), dec!(500000)),
            &breaker,
            now,
        );
        assert!(verdict.is_accepted());
    }

    #[test]
    fn test_exit_without_position_rejected() {
        let now = Utc::now();
        let gate = RiskGate::new(limits());
        let (state, ledger, breaker) = fresh(now);
        let exit = Signal::new(
            Symbol::from("SOL"),
            Direction::Exit,
            dec!(0.9),
            Vec::new(),
            "momentum",
        );

        let verdict = gate.evaluate(
            &exit,
            &state,
            &ledger,
            &asset(dec!(500000), dec!(500000)),
            &breaker,
            now,
        );
        assert_eq!(verdict, Verdict::Rejected(RejectReason::NoOpenPosition));
    }
}
