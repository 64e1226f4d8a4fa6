//! Collaborator adapters: market data sources and execution venues.
//!
//! The engine talks to both through traits so concrete venues (paper,
//! live exchanges) are interchangeable. Retry and timeout policy lives
//! here, at the adapter boundary, so call sites stay clean.

pub mod error;
pub mod paper;
pub mod replay;
pub mod retry;
pub mod traits;

pub use error::{VenueError, VenueResult};
pub use paper::{PaperVenue, PaperVenueConfig};
pub use replay::ReplayDataSource;
pub use retry::{with_retry, RetryPolicy};
pub use traits::{ExecutionVenue, MarketDataSource};
