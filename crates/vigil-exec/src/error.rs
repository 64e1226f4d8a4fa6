//! Error types for vigil-exec.

use thiserror::Error;

/// Execution queue error types.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Invalid queue capacity: {0}")]
    InvalidCapacity(usize),
}

/// Result type alias for execution queue operations.
pub type ExecResult<T> = std::result::Result<T, ExecError>;
