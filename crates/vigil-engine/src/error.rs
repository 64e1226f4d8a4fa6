//! Error types for vigil-engine.

use thiserror::Error;

/// Engine error types.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] vigil_strategy::StrategyError),

    #[error("Queue error: {0}")]
    Queue(#[from] vigil_exec::ExecError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] vigil_persistence::PersistenceError),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Data source failure: {0}")]
    DataSource(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
