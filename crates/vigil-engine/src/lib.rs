//! The decision loop.
//!
//! One periodic task drives the full pipeline each tick: fetch data,
//! generate signals, evaluate risk, queue, execute, monitor positions
//! and reassess the circuit breaker. Hosts interact through the
//! `EngineHandle` control surface and the broadcast event channel.

pub mod engine;
pub mod error;
pub mod events;
pub mod settings;
pub mod state;

pub use engine::{Engine, EngineHandle};
pub use error::{EngineError, EngineResult};
pub use events::EngineEvent;
pub use settings::{EngineSettings, OperatingMode};
pub use state::{EngineState, TickPhase};
