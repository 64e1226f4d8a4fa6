//! Error types for vigil-venue.

use thiserror::Error;

/// Venue adapter error types.
#[derive(Debug, Error)]
pub enum VenueError {
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Submission failed: {reason}")]
    Submission { reason: String },

    #[error("Market data unavailable: {0}")]
    DataSource(String),

    #[error("Retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

/// Result type alias for venue operations.
pub type VenueResult<T> = std::result::Result<T, VenueError>;
