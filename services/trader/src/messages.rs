//! Wire message definitions
//!
//! Every record is a JSON object tagged by its `"type"` field. Inbound
//! records are [`ServerMessage`]s, outbound ones [`ClientMessage`]s. The
//! direction field travels as `"dir"` and is decoded into [`Side`], so an
//! invalid direction never gets past deserialization.

use serde::{Deserialize, Serialize};
use types::ids::{OrderId, Symbol};
use types::numeric::{Level, Position, Price, Size};
use types::order::Side;

/// Starting position for one symbol, as reported in the exchange's hello.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolPosition {
    pub symbol: Symbol,
    pub position: Position,
}

/// Records sent by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Reply to the client hello
    Hello {
        #[serde(default)]
        symbols: Vec<SymbolPosition>,
    },

    /// Trading opened for the listed symbols
    Open {
        #[serde(default)]
        symbols: Vec<Symbol>,
    },

    /// Round over; the session ends
    Close {
        #[serde(default)]
        symbols: Vec<Symbol>,
    },

    /// Exchange-side error not tied to an order
    Error { error: String },

    /// Full book for one symbol, each side best first
    Book {
        symbol: Symbol,
        buy: Vec<Level>,
        sell: Vec<Level>,
    },

    /// Public trade print
    Trade {
        symbol: Symbol,
        price: Price,
        size: Size,
    },

    /// Order accepted by the exchange
    Ack { order_id: OrderId },

    /// Order or cancel refused
    Reject { order_id: OrderId, error: String },

    /// One of our orders traded
    Fill {
        order_id: OrderId,
        symbol: Symbol,
        #[serde(rename = "dir")]
        side: Side,
        price: Price,
        size: Size,
    },

    /// Order no longer on the book
    Out { order_id: OrderId },
}

impl ServerMessage {
    /// Message kind as a static label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Hello { .. } => "hello",
            ServerMessage::Open { .. } => "open",
            ServerMessage::Close { .. } => "close",
            ServerMessage::Error { .. } => "error",
            ServerMessage::Book { .. } => "book",
            ServerMessage::Trade { .. } => "trade",
            ServerMessage::Ack { .. } => "ack",
            ServerMessage::Reject { .. } => "reject",
            ServerMessage::Fill { .. } => "fill",
            ServerMessage::Out { .. } => "out",
        }
    }

    /// Symbol the message refers to, if any.
    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            ServerMessage::Book { symbol, .. }
            | ServerMessage::Trade { symbol, .. }
            | ServerMessage::Fill { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    /// Whether this message ends the session.
    pub fn is_close(&self) -> bool {
        matches!(self, ServerMessage::Close { .. })
    }
}

/// Records sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Identification handshake, sent once right after connecting
    Hello { team: String },

    /// New limit order
    Add {
        order_id: OrderId,
        symbol: Symbol,
        #[serde(rename = "dir")]
        side: Side,
        price: Price,
        size: Size,
    },

    /// Withdraw a resting order
    Cancel { order_id: OrderId },

    /// Convert between an ADR/ETF and its underlyings
    Convert {
        order_id: OrderId,
        symbol: Symbol,
        #[serde(rename = "dir")]
        side: Side,
        size: Size,
    },
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Hello { .. } => "hello",
            ClientMessage::Add { .. } => "add",
            ClientMessage::Cancel { .. } => "cancel",
            ClientMessage::Convert { .. } => "convert",
        }
    }

    /// Order id carried by the message, if any.
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            ClientMessage::Hello { .. } => None,
            ClientMessage::Add { order_id, .. }
            | ClientMessage::Cancel { order_id }
            | ClientMessage::Convert { order_id, .. } => Some(*order_id),
        }
    }
}
