//! Integer price and size types
//!
//! Prices are expressed in exchange tick units and may in principle be
//! negative (spreads); sizes are non-negative share counts.

/// Price in exchange-defined tick units
pub type Price = i64;

/// Order or fill size in shares
pub type Size = u64;

/// Signed net position in shares
pub type Position = i64;

/// A single `(price, size)` entry on one side of a book.
///
/// Serialized as a two-element array, matching the exchange's
/// `[[price, size], ...]` book representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(Price, Size)", into = "(Price, Size)")]
pub struct Level {
    pub price: Price,
    pub size: Size,
}

impl Level {
    pub fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }
}

impl From<(Price, Size)> for Level {
    fn from((price, size): (Price, Size)) -> Self {
        Self { price, size }
    }
}

impl From<Level> for (Price, Size) {
    fn from(level: Level) -> Self {
        (level.price, level.size)
    }
}
