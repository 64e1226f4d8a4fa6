//! Crash-recovery snapshots.
//!
//! Periodically writes risk state, open positions and the breaker to a
//! JSON file; on startup the engine restores from the last snapshot.
//! The format is an implementation detail, not a compatibility
//! contract.

pub mod error;
pub mod snapshot;

pub use error::{PersistenceError, PersistenceResult};
pub use snapshot::{EngineSnapshot, SnapshotStore};
