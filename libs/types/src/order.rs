//! Order lifecycle types
//!
//! An order is created when the client submits it and is only ever
//! transitioned afterwards, never removed.

use crate::errors::OrderError;
use crate::ids::{OrderId, Symbol};
use crate::numeric::{Price, Size};
use serde::{Deserialize, Serialize};

/// Order direction
///
/// The wire carries exactly `"BUY"` or `"SELL"`; any other value fails to
/// deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }

    /// Signed multiplier applied to a fill size when updating a position
    pub fn sign(&self) -> i64 {
        match self {
            Side::BUY => 1,
            Side::SELL => -1,
        }
    }
}

/// Order status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum OrderStatus {
    /// Sent to the exchange, nothing filled yet
    #[serde(rename = "SUBMITTED")]
    Submitted,

    /// Some but not all of the size has filled
    #[serde(rename = "PARTIAL")]
    PartiallyFilled,

    /// Whole size filled (terminal)
    #[serde(rename = "FILLED")]
    Filled,

    /// Cancel requested by the client (terminal)
    #[serde(rename = "CANCELLED")]
    Cancelled,

    /// Refused by the exchange (terminal)
    #[serde(rename = "REJECTED")]
    Rejected(String),
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected(_)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Submitted => "submitted",
            OrderStatus::PartiallyFilled => "partially-filled",
            OrderStatus::Filled => "filled",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Rejected(_) => "rejected",
        }
    }
}

/// A client order as tracked by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    /// Limit price; `None` for conversions
    pub price: Option<Price>,
    pub size: Size,
    pub filled_size: Size,
    pub remaining_size: Size,
    pub status: OrderStatus,
    /// Exchange acknowledged the order
    pub acknowledged: bool,
    /// Exchange reported the order as no longer resting
    pub out: bool,
    /// Most recent reject reason received for this id
    pub last_reject: Option<String>,
}

impl Order {
    /// Create a freshly submitted order
    pub fn new(
        order_id: OrderId,
        symbol: Symbol,
        side: Side,
        price: Option<Price>,
        size: Size,
    ) -> Self {
        Self {
            order_id,
            symbol,
            side,
            price,
            size,
            filled_size: 0,
            remaining_size: size,
            status: OrderStatus::Submitted,
            acknowledged: false,
            out: false,
            last_reject: None,
        }
    }

    /// Check size invariant: filled + remaining = total
    pub fn check_invariant(&self) -> bool {
        self.filled_size + self.remaining_size == self.size
    }

    /// Whether the order can still trade
    pub fn is_live(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Apply a fill and adjust status.
    ///
    /// Returns the part of `fill_size` exceeding the remaining size; that
    /// excess is clamped away so the size invariant keeps holding.
    pub fn add_fill(&mut self, fill_size: Size) -> Size {
        let applied = fill_size.min(self.remaining_size);
        let excess = fill_size - applied;

        self.filled_size += applied;
        self.remaining_size -= applied;

        if self.remaining_size == 0 {
            self.status = OrderStatus::Filled;
        } else if self.status == OrderStatus::Submitted {
            self.status = OrderStatus::PartiallyFilled;
        }

        debug_assert!(self.check_invariant(), "Invariant violated after fill");
        excess
    }

    /// Mark the order cancelled
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::AlreadyTerminal {
                order_id: self.order_id,
                status: self.status.label(),
            });
        }
        self.status = OrderStatus::Cancelled;
        Ok(())
    }

    /// Record an exchange reject.
    ///
    /// A live order becomes `Rejected`. A terminal order keeps its status;
    /// the reject then refers to a follow-up request such as a cancel.
    pub fn reject(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.is_live() {
            self.status = OrderStatus::Rejected(reason.clone());
        }
        self.last_reject = Some(reason);
    }
}
