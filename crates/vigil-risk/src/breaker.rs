//! Circuit breaker latch.
//!
//! Armed -> Tripped on breached risk conditions, Tripped -> Armed
//! automatically once the cooldown elapses. While tripped, new entries
//! are refused; exits keep flowing.

use crate::config::RiskLimits;
use crate::state::RiskState;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
use vigil_core::Quote;

/// Why the breaker tripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TripReason {
    /// Weighted composite factor score breached the threshold.
    CompositeRisk { score: Decimal },
    /// Daily realized loss limit reached.
    DailyLossLimit { daily_pnl: Quote },
    /// Consecutive-loss streak reached the configured maximum.
    LossStreak { count: u32 },
}

impl TripReason {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CompositeRisk { .. } => "composite_risk",
            Self::DailyLossLimit { .. } => "daily_loss_limit",
            Self::LossStreak { .. } => "loss_streak",
        }
    }
}

impl fmt::Display for TripReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompositeRisk { score } => write!(f, "composite risk score {}", score),
            Self::DailyLossLimit { daily_pnl } => {
                write!(f, "daily loss limit reached (pnl {})", daily_pnl)
            }
            Self::LossStreak { count } => write!(f, "{} consecutive losses", count),
        }
    }
}

/// Breaker state, serialized into engine snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CircuitBreakerState {
    #[default]
    Armed,
    Tripped {
        at: DateTime<Utc>,
        reason: TripReason,
    },
}

impl CircuitBreakerState {
    pub fn is_tripped(&self) -> bool {
        matches!(self, Self::Tripped { .. })
    }
}

/// Thread-safe breaker latch shared via `Arc<CircuitBreaker>`.
///
/// Trip is idempotent; re-arm is automatic on the first assessment at
/// or after `tripped_at + cooldown`. There is no manual reset. The
/// cooldown is passed in from the current limits on every check, so a
/// settings update takes effect on the next assessment.
#[derive(Default)]
pub struct CircuitBreaker {
    state: RwLock<CircuitBreakerState>,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted snapshot.
    pub fn restore(state: CircuitBreakerState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Trip the breaker. No-op if already tripped; returns whether this
    /// call performed the transition.
    pub fn trip(&self, reason: TripReason, now: DateTime<Utc>) -> bool {
        let mut state = self.state.write();
        if state.is_tripped() {
            return false;
        }
        warn!(%reason, "circuit breaker tripped");
        *state = CircuitBreakerState::Tripped { at: now, reason };
        true
    }

    /// Whether the breaker blocks new entries at `now`.
    ///
    /// Re-arms in place when `cooldown` has elapsed since the trip.
    pub fn is_tripped(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        {
            let state = self.state.read();
            match &*state {
                CircuitBreakerState::Armed => return false,
                CircuitBreakerState::Tripped { at, .. } if now - *at < cooldown => {
                    return true
                }
                CircuitBreakerState::Tripped { .. } => {}
            }
        }
        let mut state = self.state.write();
        // Another caller may have re-armed between the locks.
        if state.is_tripped() {
            info!("circuit breaker cooldown elapsed, re-armed");
            *state = CircuitBreakerState::Armed;
        }
        false
    }

    /// Current state after applying any due re-arm.
    pub fn state(&self, now: DateTime<Utc>, cooldown: Duration) -> CircuitBreakerState {
        self.is_tripped(now, cooldown);
        self.state.read().clone()
    }

    /// Check the trip conditions against the current risk state.
    ///
    /// Returns the reason when this call newly tripped the breaker.
    pub fn assess(
        &self,
        risk_state: &RiskState,
        limits: &RiskLimits,
        now: DateTime<Utc>,
    ) -> Option<TripReason> {
        if self.is_tripped(now, limits.breaker_cooldown()) {
            return None;
        }

        let composite = risk_state.composite_score(&limits.weights);
        let reason = if composite > limits.composite_risk_threshold {
            TripReason::CompositeRisk { score: composite }
        } else if risk_state.daily_loss_breached(limits) {
            TripReason::DailyLossLimit {
                daily_pnl: risk_state.daily_realized_pnl,
            }
        } else if risk_state.consecutive_losses >= limits.max_consecutive_losses {
            TripReason::LossStreak {
                count: risk_state.consecutive_losses,
            }
        } else {
            return None;
        };

        self.trip(reason.clone(), now).then_some(reason)
    }
}
