//! Snapshot file handling.

use crate::error::PersistenceResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vigil_position::Position;
use vigil_risk::{CircuitBreakerState, RiskState};

/// Everything needed to resume after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub taken_at: DateTime<Utc>,
    pub risk_state: RiskState,
    pub positions: Vec<Position>,
    pub breaker: CircuitBreakerState,
}

/// Reads and writes snapshots at a fixed path.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write atomically: temp file in the same directory, then rename.
    pub fn save(&self, snapshot: &EngineSnapshot) -> PersistenceResult<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), positions = snapshot.positions.len(), "snapshot saved");
        Ok(())
    }

    /// Load the last snapshot, None if the file does not exist.
    pub fn load(&self) -> PersistenceResult<Option<EngineSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                // A corrupt snapshot must not block startup.
                warn!(path = %self.path.display(), %err, "snapshot unreadable, starting fresh");
                Ok(None)
            }
        }
    }
}
