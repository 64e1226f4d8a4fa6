//! Bounded FIFO queue for risk-approved trade intents.
//!
//! Backpressure drops rather than blocks: a dropped intent is
//! re-derivable from fresh signals next tick, so the queue never stalls
//! the loop.

pub mod error;
pub mod queue;

pub use error::{ExecError, ExecResult};
pub use queue::{EnqueueResult, ExecutionQueue};
