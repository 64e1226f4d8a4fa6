//! Application configuration.

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use vigil_core::{AssetSnapshot, Price, Quote, Symbol};
use vigil_engine::EngineSettings;
use vigil_strategy::StrategySpec;
use vigil_venue::PaperVenueConfig;

/// A watchlist asset for the scripted (paper) market data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub symbol: String,
    pub price: Decimal,
    #[serde(default = "default_volume_24h")]
    pub volume_24h: Decimal,
    #[serde(default = "default_liquidity")]
    pub liquidity: Decimal,
    #[serde(default = "default_volatility")]
    pub volatility: Decimal,
    #[serde(default = "default_correlation")]
    pub correlation: Decimal,
}

fn default_volume_24h() -> Decimal {
    Decimal::from(1_000_000)
}

fn default_liquidity() -> Decimal {
    Decimal::from(500_000)
}

fn default_volatility() -> Decimal {
    Decimal::new(15, 2) // 0.15
}

fn default_correlation() -> Decimal {
    Decimal::new(20, 2) // 0.20
}

impl AssetConfig {
    pub fn to_snapshot(&self) -> AssetSnapshot {
        AssetSnapshot {
            symbol: Symbol::from(self.symbol.as_str()),
            price: Price::new(self.price),
            volume_24h: Quote::new(self.volume_24h),
            liquidity: Quote::new(self.liquidity),
            volatility: self.volatility,
            correlation: self.correlation,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Engine settings block; the watchlist defaults to the configured
    /// assets when empty.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Strategies in evaluation order.
    #[serde(default)]
    pub strategies: Vec<StrategySpec>,
    /// Scripted market data assets.
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
    /// Paper venue fill model.
    #[serde(default)]
    pub paper: PaperVenueConfig,
    /// Snapshot file for crash recovery; None disables persistence.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

impl AppConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.finish()?;
        Ok(config)
    }

    /// Load from a file when it exists, defaults otherwise.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            let mut config = Self::default();
            config.finish()?;
            Ok(config)
        }
    }

    /// Fill derived fields and validate.
    fn finish(&mut self) -> AppResult<()> {
        if self.engine.watchlist.is_empty() {
            self.engine.watchlist = self
                .assets
                .iter()
                .map(|a| Symbol::from(a.symbol.as_str()))
                .collect();
        }
        self.engine.validate().map_err(AppError::Config)?;
        for spec in &self.strategies {
            spec.validate().map_err(AppError::Config)?;
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            strategies: vec![StrategySpec::Momentum(Default::default())],
            assets: vec![AssetConfig {
                symbol: "SOL".to_string(),
                price: Decimal::from(150),
                volume_24h: default_volume_24h(),
                liquidity: default_liquidity(),
                volatility: default_volatility(),
                correlation: default_correlation(),
            }],
            paper: PaperVenueConfig::default(),
            snapshot_path: None,
        }
    }
}
