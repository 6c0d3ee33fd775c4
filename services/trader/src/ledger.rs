//! Order ledger
//!
//! Sole issuer of order ids and the record of every order submitted during
//! the session. Orders are only transitioned, never removed.
//!
//! Exchange reports (`fill`, `reject`, `ack`, `out`) for ids the ledger does
//! not know are logged and ignored. Misuse by the client itself (duplicate
//! or foreign ids, cancelling an unknown order) is an [`InvariantViolation`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};
use types::errors::OrderError;
use types::ids::{OrderId, OrderIdSequence, Symbol};
use types::numeric::{Price, Size};
use types::order::{Order, Side};

use crate::error::InvariantViolation;
use crate::messages::ServerMessage;

#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    ids: OrderIdSequence,
    orders: BTreeMap<OrderId, Order>,
    /// Ids of live, still-resting orders per symbol
    resting: BTreeMap<Symbol, BTreeSet<OrderId>>,
    fills_recorded: u64,
    rejects_recorded: u64,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh order id, strictly greater than all previous ones.
    pub fn next_id(&mut self) -> OrderId {
        self.ids.next_id()
    }

    /// Record a submitted order.
    ///
    /// The id must have been issued by [`next_id`](Self::next_id) and not
    /// used before; the size must be positive.
    pub fn record_submission(
        &mut self,
        order_id: OrderId,
        symbol: Symbol,
        side: Side,
        price: Option<Price>,
        size: Size,
    ) -> Result<(), InvariantViolation> {
        if !self.ids.has_issued(order_id) {
            return Err(InvariantViolation::UnissuedOrderId(order_id));
        }
        if self.orders.contains_key(&order_id) {
            return Err(InvariantViolation::DuplicateOrderId(order_id));
        }
        if size == 0 {
            return Err(OrderError::InvalidSize(size).into());
        }

        debug!(%order_id, symbol = %symbol, ?side, ?price, size, "Order submitted");
        self.orders
            .insert(order_id, Order::new(order_id, symbol, side, price, size));
        self.reindex(order_id);
        Ok(())
    }

    /// Apply a fill reported by the exchange.
    pub fn record_fill(&mut self, order_id: OrderId, size: Size) {
        let Some(order) = self.orders.get_mut(&order_id) else {
            warn!(%order_id, size, "Fill for unknown order ignored");
            return;
        };

        let excess = order.add_fill(size);
        self.fills_recorded += 1;
        if excess > 0 {
            warn!(
                %order_id,
                size,
                excess,
                "Fill exceeds remaining size; clamped"
            );
        }
        debug!(
            %order_id,
            filled = order.filled_size,
            remaining = order.remaining_size,
            status = order.status.label(),
            "Order filled"
        );
        self.reindex(order_id);
    }

    /// Apply an exchange reject.
    pub fn record_reject(&mut self, order_id: OrderId, reason: &str) {
        let Some(order) = self.orders.get_mut(&order_id) else {
            warn!(%order_id, reason, "Reject for unknown order ignored");
            return;
        };
        order.reject(reason);
        self.rejects_recorded += 1;
        self.reindex(order_id);
    }

    /// Mark a live order as cancelled once the client requests the cancel.
    ///
    /// Cancelling an order that is already terminal leaves it unchanged.
    pub fn record_cancel_request(&mut self, order_id: OrderId) -> Result<(), InvariantViolation> {
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(InvariantViolation::UnknownOrder(order_id))?;

        if let Err(err) = order.cancel() {
            debug!(%order_id, error = %err, "Cancel requested for terminal order");
        }
        self.reindex(order_id);
        Ok(())
    }

    /// Note that the exchange acknowledged the order.
    pub fn record_ack(&mut self, order_id: OrderId) {
        match self.orders.get_mut(&order_id) {
            Some(order) => order.acknowledged = true,
            None => warn!(%order_id, "Ack for unknown order ignored"),
        }
    }

    /// Note that the order left the book. Its status is left alone; it
    /// just stops counting as resting.
    pub fn record_out(&mut self, order_id: OrderId) {
        match self.orders.get_mut(&order_id) {
            Some(order) => order.out = true,
            None => {
                warn!(%order_id, "Out for unknown order ignored");
                return;
            }
        }
        self.reindex(order_id);
    }

    /// Keep `resting` in step with the order's current state.
    fn reindex(&mut self, order_id: OrderId) {
        let Some(order) = self.orders.get(&order_id) else {
            return;
        };
        if order.is_live() && !order.out {
            self.resting
                .entry(order.symbol.clone())
                .or_default()
                .insert(order_id);
        } else if let Some(ids) = self.resting.get_mut(order.symbol.as_str()) {
            ids.remove(&order_id);
        }
    }

    /// Apply any order-related change carried by an inbound message.
    pub fn apply(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::Fill { order_id, size, .. } => self.record_fill(*order_id, *size),
            ServerMessage::Reject { order_id, error } => self.record_reject(*order_id, error),
            ServerMessage::Ack { order_id } => self.record_ack(*order_id),
            ServerMessage::Out { order_id } => self.record_out(*order_id),
            _ => {}
        }
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Live orders still resting on the book for a symbol, oldest first.
    pub fn open_orders<'a>(&'a self, symbol: &str) -> impl Iterator<Item = &'a Order> + 'a {
        self.resting
            .get(symbol)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(move |id| self.orders.get(id))
    }

    /// Remaining size across live orders on one side of a symbol.
    pub fn open_size(&self, symbol: &str, side: Side) -> Size {
        self.open_orders(symbol)
            .filter(|o| o.side == side)
            .map(|o| o.remaining_size)
            .sum()
    }

    /// All orders in id order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn fills_recorded(&self) -> u64 {
        self.fills_recorded
    }

    pub fn rejects_recorded(&self) -> u64 {
        self.rejects_recorded
    }
}
