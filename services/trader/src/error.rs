//! Error taxonomy for the trading client
//!
//! Every variant here is fatal to a session. Exchange-reported `reject` and
//! `error` records are not errors; they surface as [`ExchangeSignal`]s.

use std::io;
use std::time::Duration;

use thiserror::Error;
use types::errors::OrderError;
use types::ids::{OrderId, Symbol};
use types::order::Side;

/// Transport could not be established or maintained.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("timed out connecting to {addr} after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("connection closed by peer")]
    Closed,

    #[error("no data received for {0:?}")]
    ReadTimeout(Duration),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// A line could not be decoded into a valid message, or a message could not
/// be encoded.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message {line:?}: {reason}")]
    Malformed { line: String, reason: String },

    #[error("failed to encode message: {0}")]
    Encode(String),

    #[error("{side:?} fill of {size} on {symbol} does not fit the position")]
    PositionOverflow { symbol: Symbol, side: Side, size: u64 },
}

/// Internal misuse, indicating a bug in decision logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("order id {0} submitted twice")]
    DuplicateOrderId(OrderId),

    #[error("order id {0} was not issued by the ledger")]
    UnissuedOrderId(OrderId),

    #[error("order id {0} is not known to the ledger")]
    UnknownOrder(OrderId),

    #[error("invalid order: {0}")]
    InvalidOrder(#[from] OrderError),
}

/// Umbrella error returned by a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Non-fatal condition reported by the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeSignal {
    Reject { order_id: OrderId, reason: String },
    Error { description: String },
}

impl std::fmt::Display for ExchangeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangeSignal::Reject { order_id, reason } => {
                write!(f, "order {} rejected: {}", order_id, reason)
            }
            ExchangeSignal::Error { description } => write!(f, "exchange error: {}", description),
        }
    }
}
