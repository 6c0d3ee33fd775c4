//! Pluggable decision logic
//!
//! A [`Strategy`] runs whenever its scheduler timer fires. It reads the
//! market state and order ledger through a [`DecisionContext`] and emits
//! orders only through that context, which issues ids from the ledger,
//! records the submission and queues the outbound message for the session
//! to send.
//!
//! Strategies must tolerate skipped or delayed fires and must not assume any
//! particular inbound message caused the fire.

pub mod fair_value;
pub mod inventory;
pub mod penny;

use std::time::Instant;

use tracing::debug;
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Size};
use types::order::Side;

use crate::error::InvariantViolation;
use crate::ledger::OrderLedger;
use crate::market_state::MarketState;
use crate::messages::ClientMessage;

pub use fair_value::{FairValueArbitrage, FairValueConfig};
pub use inventory::{InventoryBalancer, InventoryBand, InventoryConfig};
pub use penny::{PennyConfig, PennyQuoter};

/// Decision function bound to a scheduler timer.
pub trait Strategy {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Called when the strategy's timer fires.
    fn on_timer(&mut self, ctx: &mut DecisionContext<'_>) -> Result<(), InvariantViolation>;
}

/// View of session state handed to a strategy, plus its order-emitting
/// operations.
pub struct DecisionContext<'a> {
    market: &'a MarketState,
    ledger: &'a mut OrderLedger,
    outbox: &'a mut Vec<ClientMessage>,
    now: Instant,
}

impl<'a> DecisionContext<'a> {
    pub fn new(
        market: &'a MarketState,
        ledger: &'a mut OrderLedger,
        outbox: &'a mut Vec<ClientMessage>,
        now: Instant,
    ) -> Self {
        Self {
            market,
            ledger,
            outbox,
            now,
        }
    }

    pub fn market(&self) -> &MarketState {
        self.market
    }

    pub fn ledger(&self) -> &OrderLedger {
        self.ledger
    }

    /// Instant the firing timer was polled at.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Queue a new limit order.
    pub fn add(
        &mut self,
        symbol: &Symbol,
        side: Side,
        price: Price,
        size: Size,
    ) -> Result<OrderId, InvariantViolation> {
        let order_id = self.ledger.next_id();
        self.ledger
            .record_submission(order_id, symbol.clone(), side, Some(price), size)?;
        self.outbox.push(ClientMessage::Add {
            order_id,
            symbol: symbol.clone(),
            side,
            price,
            size,
        });
        Ok(order_id)
    }

    /// Queue a cancel for an order previously added in this session.
    pub fn cancel(&mut self, order_id: OrderId) -> Result<(), InvariantViolation> {
        self.ledger.record_cancel_request(order_id)?;
        self.outbox.push(ClientMessage::Cancel { order_id });
        Ok(())
    }

    /// Queue a conversion request.
    pub fn convert(
        &mut self,
        symbol: &Symbol,
        side: Side,
        size: Size,
    ) -> Result<OrderId, InvariantViolation> {
        let order_id = self.ledger.next_id();
        self.ledger
            .record_submission(order_id, symbol.clone(), side, None, size)?;
        debug!(%order_id, symbol = %symbol, ?side, size, "Convert queued");
        self.outbox.push(ClientMessage::Convert {
            order_id,
            symbol: symbol.clone(),
            side,
            size,
        });
        Ok(order_id)
    }

    /// Messages queued so far, including those of earlier strategies in the
    /// same poll.
    pub fn queued(&self) -> usize {
        self.outbox.len()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::Harness;
    use super::*;
    use types::order::OrderStatus;

    #[test]
    fn test_add_records_and_queues() {
        let mut h = Harness::new();
        let mut ctx = DecisionContext::new(&h.market, &mut h.ledger, &mut h.outbox, Instant::now());

        let id = ctx.add(&Symbol::new("BOND"), Side::BUY, 999, 1).unwrap();
        assert_eq!(ctx.queued(), 1);
        assert_eq!(ctx.ledger().get(id).unwrap().price, Some(999));

        assert!(matches!(h.outbox[0], ClientMessage::Add { price: 999, .. }));
    }

    #[test]
    fn test_add_then_cancel_same_id() {
        let mut h = Harness::new();
        let mut ctx = DecisionContext::new(&h.market, &mut h.ledger, &mut h.outbox, Instant::now());

        let id = ctx.add(&Symbol::new("BOND"), Side::SELL, 1001, 1).unwrap();
        ctx.cancel(id).unwrap();

        assert_eq!(h.outbox.len(), 2);
        assert_eq!(h.outbox[0].kind(), "add");
        assert_eq!(h.outbox[1], ClientMessage::Cancel { order_id: id });
        assert_eq!(h.ledger.get(id).unwrap().status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_cancel_unknown_is_violation() {
        let mut h = Harness::new();
        let id = h.ledger.next_id();
        let mut ctx = DecisionContext::new(&h.market, &mut h.ledger, &mut h.outbox, Instant::now());

        assert_eq!(ctx.cancel(id).unwrap_err(), InvariantViolation::UnknownOrder(id));
        assert!(h.outbox.is_empty());
    }

    #[test]
    fn test_convert_has_no_price() {
        let mut h = Harness::new();
        let mut ctx = DecisionContext::new(&h.market, &mut h.ledger, &mut h.outbox, Instant::now());

        let id = ctx.convert(&Symbol::new("VALE"), Side::SELL, 10).unwrap();
        assert!(ctx.ledger().get(id).unwrap().price.is_none());
        assert!(matches!(h.outbox[0], ClientMessage::Convert { size: 10, .. }));
    }

    #[test]
    fn test_zero_size_add_not_queued() {
        let mut h = Harness::new();
        let mut ctx = DecisionContext::new(&h.market, &mut h.ledger, &mut h.outbox, Instant::now());

        assert!(ctx.add(&Symbol::new("BOND"), Side::BUY, 999, 0).is_err());
        assert!(h.outbox.is_empty());
    }
}
