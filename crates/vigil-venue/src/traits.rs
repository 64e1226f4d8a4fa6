//! The two collaborator seams the engine depends on.

use crate::error::VenueResult;
use async_trait::async_trait;
use vigil_core::{Fill, MarketSnapshot, Symbol, TradeIntent};

/// Source of per-tick market data.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch a snapshot for the watchlist. May omit individual symbols
    /// (per-asset failure) or fail wholesale.
    async fn snapshot(&self, symbols: &[Symbol]) -> VenueResult<MarketSnapshot>;
}

/// Order submission endpoint.
///
/// Signing and authorization happen inside concrete implementations;
/// the engine treats submission as opaque. Idempotency is
/// venue-specific, so a failed submission is never retried within the
/// same tick.
#[async_trait]
pub trait ExecutionVenue: Send + Sync {
    /// Venue name for logs and fills.
    fn name(&self) -> &str;

    /// Submit one intent and wait for the fill.
    async fn submit(&self, intent: &TradeIntent) -> VenueResult<Fill>;
}
