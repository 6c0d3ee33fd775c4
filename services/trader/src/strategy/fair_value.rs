//! Cross-instrument fair-value arbitrage
//!
//! Fair value is the floor mid of a reference instrument's book (VALBZ by
//! default). When the target instrument (VALE) bids above fair value by more
//! than the margin we sell into that bid; when it offers below fair value by
//! more than the margin we buy the offer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use types::ids::Symbol;
use types::numeric::{Price, Size};
use types::order::Side;

use super::{DecisionContext, Strategy};
use crate::error::InvariantViolation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairValueConfig {
    /// Instrument the fair value is derived from
    pub reference: Symbol,
    /// Instrument orders are posted on
    pub target: Symbol,
    /// Required distance beyond fair value before trading
    pub margin: Price,
    pub size: Size,
    pub interval_ms: u64,
}

impl Default for FairValueConfig {
    fn default() -> Self {
        Self {
            reference: Symbol::new("VALBZ"),
            target: Symbol::new("VALE"),
            margin: 0,
            size: 1,
            interval_ms: 10,
        }
    }
}

impl FairValueConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

pub struct FairValueArbitrage {
    config: FairValueConfig,
}

impl FairValueArbitrage {
    pub fn new(config: FairValueConfig) -> Self {
        Self { config }
    }
}

impl Strategy for FairValueArbitrage {
    fn name(&self) -> &str {
        "fair-value"
    }

    fn on_timer(&mut self, ctx: &mut DecisionContext<'_>) -> Result<(), InvariantViolation> {
        let Some(fair) = ctx.market().mid_price(self.config.reference.as_str()) else {
            return Ok(());
        };
        let target = self.config.target.as_str();
        let bid = ctx.market().best_bid(target);
        let ask = ctx.market().best_ask(target);

        if let Some(bid) = bid.filter(|bid| bid.saturating_sub(fair) > self.config.margin) {
            debug!(fair, bid, symbol = target, "Target bid above fair value");
            ctx.add(&self.config.target, Side::SELL, bid, self.config.size)?;
        }
        if let Some(ask) = ask.filter(|ask| fair.saturating_sub(*ask) > self.config.margin) {
            debug!(fair, ask, symbol = target, "Target ask below fair value");
            ctx.add(&self.config.target, Side::BUY, ask, self.config.size)?;
        }
        Ok(())
    }
}
