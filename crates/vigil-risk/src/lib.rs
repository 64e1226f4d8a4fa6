//! Risk controls for the vigil trading engine.
//!
//! Three layers:
//! - `RiskState`: rolling daily PnL, loss streak and factor scores.
//! - `RiskGate`: ordered pre-trade checks plus deterministic sizing.
//! - `CircuitBreaker`: global halt latch with automatic cooldown re-arm.

pub mod breaker;
pub mod config;
pub mod gate;
pub mod state;

pub use breaker::{CircuitBreaker, CircuitBreakerState, TripReason};
pub use config::{RiskLimits, RiskWeights};
pub use gate::{RiskGate, Verdict};
pub use state::{RiskFactorScores, RiskState};
