//! Scripted market data source.
//!
//! Serves a pre-built sequence of snapshots, one per call. Drives dry
//! runs and integration tests without any feed plumbing.

use crate::error::{VenueError, VenueResult};
use crate::traits::MarketDataSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use vigil_core::{MarketSnapshot, Symbol};

pub struct ReplayDataSource {
    snapshots: Vec<MarketSnapshot>,
    cursor: Mutex<usize>,
    /// Loop back to the first snapshot when exhausted.
    cycle: bool,
}

impl ReplayDataSource {
    pub fn new(snapshots: Vec<MarketSnapshot>, cycle: bool) -> Self {
        Self {
            snapshots,
            cursor: Mutex::new(0),
            cycle,
        }
    }
}

#[async_trait]
impl MarketDataSource for ReplayDataSource {
    async fn snapshot(&self, symbols: &[Symbol]) -> VenueResult<MarketSnapshot> {
        let index = {
            let mut cursor = self.cursor.lock();
            if *cursor >= self.snapshots.len() {
                if !self.cycle || self.snapshots.is_empty() {
                    return Err(VenueError::DataSource("replay exhausted".to_string()));
                }
                *cursor = 0;
            }
            let index = *cursor;
            *cursor += 1;
            index
        };

        let full = &self.snapshots[index];
        let filtered: MarketSnapshot = symbols
            .iter()
            .filter_map(|s| full.get(s).cloned())
            .collect();
        Ok(filtered)
    }
}
