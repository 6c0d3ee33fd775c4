//! Inventory balancing
//!
//! Keeps each configured position inside a safeguard band. When a position
//! leaves the band, an offsetting order is posted at the touch (best bid to
//! sell down a long, best ask to buy back a short), sized to bring the
//! position back to the band edge. Size already resting on the offsetting
//! side counts toward the correction, so repeated fires do not pile up
//! orders.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;
use types::ids::Symbol;
use types::numeric::{Position, Size};
use types::order::Side;

use super::{DecisionContext, Strategy};
use crate::error::InvariantViolation;

/// Safeguard band for one symbol: positions in `[-band, band]` are fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryBand {
    pub symbol: Symbol,
    pub band: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub bands: Vec<InventoryBand>,
    pub interval_ms: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            bands: vec![
                InventoryBand {
                    symbol: Symbol::new("BOND"),
                    band: 50,
                },
                InventoryBand {
                    symbol: Symbol::new("VALBZ"),
                    band: 5,
                },
                InventoryBand {
                    symbol: Symbol::new("VALE"),
                    band: 5,
                },
            ],
            interval_ms: 100,
        }
    }
}

impl InventoryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

pub struct InventoryBalancer {
    config: InventoryConfig,
}

impl InventoryBalancer {
    pub fn new(config: InventoryConfig) -> Self {
        Self { config }
    }

    fn rebalance(&self, ctx: &mut DecisionContext<'_>, band: &InventoryBand) -> Result<(), InvariantViolation> {
        let symbol = band.symbol.as_str();
        let position = ctx.market().position(symbol);
        let limit = band.band.unsigned_abs();
        if position.unsigned_abs() <= limit {
            return Ok(());
        }

        let held = if position > 0 { Side::BUY } else { Side::SELL };
        let side = held.opposite();
        let touch = match side {
            Side::SELL => ctx.market().best_bid(symbol),
            Side::BUY => ctx.market().best_ask(symbol),
        };
        let Some(price) = touch else {
            return Ok(());
        };

        let excess: Size = position.unsigned_abs() - limit;
        let pending = ctx.ledger().open_size(symbol, side);
        let needed = excess.saturating_sub(pending);
        if needed == 0 {
            return Ok(());
        }

        info!(symbol, position, band = limit, ?side, price, size = needed, "Rebalancing inventory");
        ctx.add(&band.symbol, side, price, needed)?;
        Ok(())
    }
}

impl Strategy for InventoryBalancer {
    fn name(&self) -> &str {
        "inventory"
    }

    fn on_timer(&mut self, ctx: &mut DecisionContext<'_>) -> Result<(), InvariantViolation> {
        for band in &self.config.bands {
            self.rebalance(ctx, band)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::ClientMessage;
    use crate::strategy::test_support::Harness;
    use types::numeric::Level;

    fn harness_with_book(symbol: &str, bid: i64, ask: i64) -> Harness {
        let mut h = Harness::new();
        h.market.apply_book(
            Symbol::new(symbol),
            vec![Level::new(bid, 10)],
            vec![Level::new(ask, 10)],
        );
        h
    }

    fn balancer(symbol: &str, band: Position) -> InventoryBalancer {
        InventoryBalancer::new(InventoryConfig {
            bands: vec![InventoryBand {
                symbol: Symbol::new(symbol),
                band,
            }],
            interval_ms: 100,
        })
    }

    #[test]
    fn test_inside_band_no_orders() {
        let mut h = harness_with_book("BOND", 999, 1001);
        h.market.apply_fill(&Symbol::new("BOND"), Side::BUY, 10).unwrap();
        let mut strat = balancer("BOND", 10);

        h.run(&mut strat).unwrap();
        assert!(h.outbox.is_empty());
    }

    #[test]
    fn test_long_position_sold_at_bid() {
        let mut h = harness_with_book("BOND", 999, 1001);
        h.market.apply_fill(&Symbol::new("BOND"), Side::BUY, 14).unwrap();
        let mut strat = balancer("BOND", 10);

        h.run(&mut strat).unwrap();

        assert_eq!(h.outbox.len(), 1);
        assert!(matches!(
            h.outbox[0],
            ClientMessage::Add { side: Side::SELL, price: 999, size: 4, .. }
        ));
    }

    #[test]
    fn test_short_position_bought_at_ask() {
        let mut h = harness_with_book("VALE", 4000, 4010);
        h.market.apply_fill(&Symbol::new("VALE"), Side::SELL, 8).unwrap();
        let mut strat = balancer("VALE", 5);

        h.run(&mut strat).unwrap();

        assert!(matches!(
            h.outbox[0],
            ClientMessage::Add { side: Side::BUY, price: 4010, size: 3, .. }
        ));
    }

    #[test]
    fn test_open_offsetting_size_not_duplicated() {
        let mut h = harness_with_book("BOND", 999, 1001);
        h.market.apply_fill(&Symbol::new("BOND"), Side::BUY, 14).unwrap();
        let mut strat = balancer("BOND", 10);

        h.run(&mut strat).unwrap();
        h.run(&mut strat).unwrap();
        assert_eq!(h.outbox.len(), 1);

        // Position grows further: only the additional excess is posted.
        h.market.apply_fill(&Symbol::new("BOND"), Side::BUY, 2).unwrap();
        h.run(&mut strat).unwrap();
        assert_eq!(h.outbox.len(), 2);
        assert!(matches!(h.outbox[1], ClientMessage::Add { size: 2, .. }));
    }

    #[test]
    fn test_extreme_position_and_band() {
        let mut h = harness_with_book("BOND", 999, 1001);
        h.market.apply_fill(&Symbol::new("BOND"), Side::SELL, i64::MAX as u64).unwrap();
        h.market.apply_fill(&Symbol::new("BOND"), Side::SELL, 1).unwrap();
        assert_eq!(h.market.position("BOND"), i64::MIN);

        // A band of i64::MIN covers every position.
        let mut wide = balancer("BOND", i64::MIN);
        h.run(&mut wide).unwrap();
        assert!(h.outbox.is_empty());

        let mut strat = balancer("BOND", 0);
        h.run(&mut strat).unwrap();
        assert!(matches!(
            h.outbox[0],
            ClientMessage::Add { side: Side::BUY, price: 1001, size, .. } if size == 1u64 << 63
        ));
    }

    #[test]
    fn test_missing_touch_skipped() {
        let mut h = Harness::new();
        h.market.apply_book(Symbol::new("BOND"), vec![], vec![Level::new(1001, 1)]);
        h.market.apply_fill(&Symbol::new("BOND"), Side::BUY, 20).unwrap();
        let mut strat = balancer("BOND", 10);

        h.run(&mut strat).unwrap();
        assert!(h.outbox.is_empty());
    }
}
