//! Market state store
//!
//! Per-symbol book snapshot and signed position, updated only from inbound
//! messages. Books are replaced wholesale on every `book` record; no history
//! is kept. Uses `BTreeMap` so iteration is in symbol order.

use std::collections::BTreeMap;

use tracing::debug;
use types::ids::Symbol;
use types::numeric::{Level, Position, Price, Size};
use types::order::Side;

use crate::error::ProtocolError;
use crate::messages::ServerMessage;

/// Latest book snapshot for one symbol.
///
/// Bids and asks are kept in the order the exchange sent them, best first.
/// best bid <= best ask is assumed but never checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    pub bids: Vec<Level>,
    pub asks: Vec<Level>,
}

impl Book {
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    /// Mid price rounded toward negative infinity.
    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            // floor((bid + ask) / 2) without overflowing the sum
            (Some(bid), Some(ask)) => Some((bid >> 1) + (ask >> 1) + (bid & ask & 1)),
            _ => None,
        }
    }

    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.saturating_sub(bid)),
            _ => None,
        }
    }
}

/// Session-scoped market state.
#[derive(Debug, Clone, Default)]
pub struct MarketState {
    books: BTreeMap<Symbol, Book>,
    positions: BTreeMap<Symbol, Position>,
    last_trades: BTreeMap<Symbol, Price>,
    open_symbols: Vec<Symbol>,
}

impl MarketState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply any state change carried by an inbound message.
    ///
    /// Fails only for a fill the signed position cannot represent; nothing
    /// is changed in that case.
    pub fn apply(&mut self, message: &ServerMessage) -> Result<(), ProtocolError> {
        match message {
            ServerMessage::Book { symbol, buy, sell } => {
                self.apply_book(symbol.clone(), buy.clone(), sell.clone());
            }
            ServerMessage::Fill {
                symbol, side, size, ..
            } => {
                self.apply_fill(symbol, *side, *size)?;
            }
            ServerMessage::Trade { symbol, price, .. } => {
                self.last_trades.insert(symbol.clone(), *price);
            }
            ServerMessage::Open { symbols } => {
                for symbol in symbols {
                    if !self.open_symbols.contains(symbol) {
                        self.open_symbols.push(symbol.clone());
                    }
                }
            }
            ServerMessage::Close { symbols } => {
                self.open_symbols.retain(|s| !symbols.contains(s));
            }
            _ => {}
        }
        Ok(())
    }

    /// Replace the stored book for `symbol`.
    pub fn apply_book(&mut self, symbol: Symbol, bids: Vec<Level>, asks: Vec<Level>) {
        self.books.insert(symbol, Book { bids, asks });
    }

    /// Adjust the signed position by +size (BUY) or -size (SELL).
    pub fn apply_fill(&mut self, symbol: &Symbol, side: Side, size: Size) -> Result<Position, ProtocolError> {
        let current = self.position(symbol.as_str());
        let updated = i64::try_from(size)
            .ok()
            .and_then(|size| match side {
                Side::BUY => current.checked_add(size),
                Side::SELL => current.checked_sub(size),
            })
            .ok_or_else(|| ProtocolError::PositionOverflow {
                symbol: symbol.clone(),
                side,
                size,
            })?;
        self.positions.insert(symbol.clone(), updated);
        debug!(symbol = %symbol, ?side, size, position = updated, "Position updated");
        Ok(updated)
    }

    pub fn best_bid(&self, symbol: &str) -> Option<Price> {
        self.books.get(symbol).and_then(Book::best_bid)
    }

    pub fn best_ask(&self, symbol: &str) -> Option<Price> {
        self.books.get(symbol).and_then(Book::best_ask)
    }

    /// Floor mid of the latest book, the reference fair value.
    pub fn mid_price(&self, symbol: &str) -> Option<Price> {
        self.books.get(symbol).and_then(Book::mid_price)
    }

    pub fn book(&self, symbol: &str) -> Option<&Book> {
        self.books.get(symbol)
    }

    /// Signed position; zero for a symbol never filled.
    pub fn position(&self, symbol: &str) -> Position {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    /// All non-default positions in symbol order.
    pub fn positions(&self) -> impl Iterator<Item = (&Symbol, Position)> {
        self.positions.iter().map(|(symbol, position)| (symbol, *position))
    }

    /// Last public trade price seen for `symbol`.
    pub fn last_trade(&self, symbol: &str) -> Option<Price> {
        self.last_trades.get(symbol).copied()
    }

    /// Symbols reported open and not since closed.
    pub fn open_symbols(&self) -> &[Symbol] {
        &self.open_symbols
    }

    /// Number of symbols with a book.
    pub fn book_count(&self) -> usize {
        self.books.len()
    }
}
