//! Binary wiring for the vigil trading engine.

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, AssetConfig};
pub use error::{AppError, AppResult};
