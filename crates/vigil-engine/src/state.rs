//! Observable engine state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use vigil_position::Position;
use vigil_risk::{CircuitBreakerState, RiskState};

/// Where a tick currently is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickPhase {
    FetchingData,
    GeneratingSignals,
    RiskEvaluating,
    Queueing,
    Executing,
    Monitoring,
    AssessingRisk,
    Idle,
}

impl fmt::Display for TickPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FetchingData => "fetching_data",
            Self::GeneratingSignals => "generating_signals",
            Self::RiskEvaluating => "risk_evaluating",
            Self::Queueing => "queueing",
            Self::Executing => "executing",
            Self::Monitoring => "monitoring",
            Self::AssessingRisk => "assessing_risk",
            Self::Idle => "idle",
        };
        write!(f, "{}", s)
    }
}

/// Snapshot of the engine for hosts, reflecting the last successfully
/// completed tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub tick: u64,
    pub phase: TickPhase,
    pub breaker: CircuitBreakerState,
    pub open_positions: Vec<Position>,
    pub risk_state: RiskState,
    pub last_tick_at: Option<DateTime<Utc>>,
}

impl EngineState {
    pub fn initial(risk_state: RiskState, breaker: CircuitBreakerState) -> Self {
        Self {
            tick: 0,
            phase: TickPhase::Idle,
            breaker,
            open_positions: Vec::new(),
            risk_state,
            last_tick_at: None,
        }
    }
}
