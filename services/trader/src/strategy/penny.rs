//! Symmetric quoting around a fixed reference price ("penny-pinching").
//!
//! Every fire posts a buy at `reference - offset` and a sell at
//! `reference + offset`. With `withdraw_immediately` each quote is followed
//! by a cancel of the same id in the same batch.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use types::ids::Symbol;
use types::numeric::{Price, Size};
use types::order::Side;

use super::{DecisionContext, Strategy};
use crate::error::InvariantViolation;

/// Configuration for the penny quoter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PennyConfig {
    pub symbol: Symbol,
    /// Price the quotes are centred on
    pub reference_price: Price,
    /// Distance of each quote from the reference
    pub offset: Price,
    pub size: Size,
    /// Timer interval in milliseconds
    pub interval_ms: u64,
    /// Skip a side once this much size is already resting on it
    pub max_open_per_side: Option<Size>,
    /// Cancel each quote right after adding it
    pub withdraw_immediately: bool,
}

impl Default for PennyConfig {
    fn default() -> Self {
        Self {
            symbol: Symbol::new("BOND"),
            reference_price: 1000,
            offset: 1,
            size: 1,
            interval_ms: 10,
            max_open_per_side: None,
            withdraw_immediately: false,
        }
    }
}

impl PennyConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

pub struct PennyQuoter {
    config: PennyConfig,
}

impl PennyQuoter {
    pub fn new(config: PennyConfig) -> Self {
        Self { config }
    }

    pub fn bid_price(&self) -> Price {
        self.config.reference_price.saturating_sub(self.config.offset)
    }

    pub fn ask_price(&self) -> Price {
        self.config.reference_price.saturating_add(self.config.offset)
    }

    fn side_has_room(&self, ctx: &DecisionContext<'_>, side: Side) -> bool {
        match self.config.max_open_per_side {
            Some(limit) => ctx.ledger().open_size(self.config.symbol.as_str(), side) < limit,
            None => true,
        }
    }

    fn quote(&self, ctx: &mut DecisionContext<'_>, side: Side, price: Price) -> Result<(), InvariantViolation> {
        if !self.side_has_room(ctx, side) {
            return Ok(());
        }
        let order_id = ctx.add(&self.config.symbol, side, price, self.config.size)?;
        if self.config.withdraw_immediately {
            ctx.cancel(order_id)?;
        }
        Ok(())
    }
}

impl Strategy for PennyQuoter {
    fn name(&self) -> &str {
        "penny"
    }

    fn on_timer(&mut self, ctx: &mut DecisionContext<'_>) -> Result<(), InvariantViolation> {
        self.quote(ctx, Side::BUY, self.bid_price())?;
        self.quote(ctx, Side::SELL, self.ask_price())
    }
}
