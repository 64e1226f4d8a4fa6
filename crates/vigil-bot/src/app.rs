//! Application wiring and lifecycle.

use crate::config::AppConfig;
use crate::error::AppResult;
use std::sync::Arc;
use tracing::info;
use vigil_core::MarketSnapshot;
use vigil_engine::{Engine, EngineHandle};
use vigil_persistence::SnapshotStore;
use vigil_strategy::StrategySet;
use vigil_venue::{PaperVenue, ReplayDataSource};

/// Owns the engine task and shuts it down on ctrl-c.
pub struct Application {
    handle: EngineHandle,
    engine: Engine,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let strategies = StrategySet::from_specs(&config.strategies)?;
        info!(strategies = ?strategies.names(), "strategies registered");

        let snapshot: MarketSnapshot = config.assets.iter().map(|a| a.to_snapshot()).collect();
        let data_source = Arc::new(ReplayDataSource::new(vec![snapshot], true));
        let venue = Arc::new(PaperVenue::new(config.paper));
        let store = config.snapshot_path.as_ref().map(SnapshotStore::new);

        let engine = Engine::new(config.engine, strategies, data_source, venue, store)?;
        let handle = engine.handle();
        Ok(Self { handle, engine })
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Run until ctrl-c, then let the in-flight tick finish.
    pub async fn run(self) -> AppResult<()> {
        let task = tokio::spawn(self.engine.run());

        tokio::signal::ctrl_c().await?;
        info!("shutdown requested");
        self.handle.stop();
        let _ = task.await;
        Ok(())
    }
}
