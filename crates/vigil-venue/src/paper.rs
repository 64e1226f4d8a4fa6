//! Paper execution venue.
//!
//! Fills every intent at the reference price adjusted by deterministic
//! slippage and fee, with no external calls. Used for dry runs and
//! integration tests.

use crate::error::{VenueError, VenueResult};
use crate::traits::ExecutionVenue;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;
use vigil_core::{Direction, Fill, Price, TradeIntent};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperVenueConfig {
    /// Adverse price movement applied to every fill (e.g. 0.001).
    #[serde(default = "default_slippage_pct")]
    pub slippage_pct: Decimal,
    /// Taker fee folded into the executed price (e.g. 0.0005).
    #[serde(default = "default_fee_pct")]
    pub fee_pct: Decimal,
}

fn default_slippage_pct() -> Decimal {
    Decimal::new(1, 3) // 0.001
}

fn default_fee_pct() -> Decimal {
    Decimal::new(5, 4) // 0.0005
}

impl Default for PaperVenueConfig {
    fn default() -> Self {
        Self {
            slippage_pct: default_slippage_pct(),
            fee_pct: default_fee_pct(),
        }
    }
}

pub struct PaperVenue {
    config: PaperVenueConfig,
    fill_seq: AtomicU64,
}

impl PaperVenue {
    pub fn new(config: PaperVenueConfig) -> Self {
        Self {
            config,
            fill_seq: AtomicU64::new(1),
        }
    }

    /// Executed price: buys pay slippage and fee, sells receive less.
    fn executed_price(&self, intent: &TradeIntent) -> Price {
        let cost = self.config.slippage_pct + self.config.fee_pct;
        let factor = match intent.direction {
            Direction::EnterLong => Decimal::ONE + cost,
            Direction::Exit => Decimal::ONE - cost,
        };
        intent.reference_price * factor
    }
}

#[async_trait]
impl ExecutionVenue for PaperVenue {
    fn name(&self) -> &str {
        "paper"
    }

    async fn submit(&self, intent: &TradeIntent) -> VenueResult<Fill> {
        let price = self.executed_price(intent);
        let size = intent.size.units_at(price).ok_or(VenueError::Submission {
            reason: format!("non-positive executed price {}", price),
        })?;
        let seq = self.fill_seq.fetch_add(1, Ordering::Relaxed);
        let fill = Fill {
            executed_price: price,
            executed_size: size,
            venue_id: format!("paper-{}", seq),
        };
        info!(
            symbol = %intent.symbol,
            direction = %intent.direction,
            price = %fill.executed_price,
            size = %fill.executed_size,
            "paper fill"
        );
        Ok(fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use vigil_core::{Quote, Symbol};

    fn intent(direction: Direction) -> TradeIntent {
        TradeIntent::new(
            Symbol::from("SOL"),
            direction,
            Quote::new(dec!(1000)),
            Price::new(dec!(100)),
            "momentum",
        )
    }

    #[tokio::test]
    async fn test_buy_pays_slippage_and_fee() {
        let venue = PaperVenue::new(PaperVenueConfig {
            slippage_pct: dec!(0.001),
            fee_pct: dec!(0.0005),
        });
        let fill = venue.submit(&intent(Direction::EnterLong)).await.unwrap();
        assert_eq!(fill.executed_price, Price::new(dec!(100.15)));
    }

    #[tokio::test]
    async fn test_sell_receives_less() {
        let venue = PaperVenue::new(PaperVenueConfig {
            slippage_pct: dec!(0.001),
            fee_pct: dec!(0.0005),
        });
        let fill = venue.submit(&intent(Direction::Exit)).await.unwrap();
        assert_eq!(fill.executed_price, Price::new(dec!(99.85)));
    }

    #[tokio::test]
    async fn test_fills_are_deterministic() {
        let venue = PaperVenue::new(PaperVenueConfig::default());
        let a = venue.submit(&intent(Direction::EnterLong)).await.unwrap();
        let b = venue.submit(&intent(Direction::EnterLong)).await.unwrap();
        assert_eq!(a.executed_price, b.executed_price);
        assert_eq!(a.executed_size, b.executed_size);
        assert_ne!(a.venue_id, b.venue_id);
    }
}
