//! Identifier types for exchange entities
//!
//! Order ids are plain ascending integers chosen by the client. The only way
//! to mint a fresh one is through an [`OrderIdSequence`]; ids otherwise only
//! appear by deserializing exchange messages.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Client-assigned order identifier
///
/// Unique for the lifetime of the process and never reused. There is no
/// public constructor: fresh ids come from [`OrderIdSequence::next_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Get the raw integer value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic issuer of order ids, starting at 1
#[derive(Debug, Clone, Default)]
pub struct OrderIdSequence {
    last: u64,
}

impl OrderIdSequence {
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// Issue the next id. Strictly greater than every id issued before.
    pub fn next_id(&mut self) -> OrderId {
        self.last += 1;
        OrderId(self.last)
    }

    /// Most recently issued id, if any
    pub fn last_issued(&self) -> Option<OrderId> {
        (self.last > 0).then_some(OrderId(self.last))
    }

    /// Whether `id` was handed out by this sequence
    pub fn has_issued(&self, id: OrderId) -> bool {
        id.0 >= 1 && id.0 <= self.last
    }
}

/// Instrument symbol as used on the wire (e.g. "BOND", "VALE")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// Get the symbol string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}
