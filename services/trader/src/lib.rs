//! Exchange Trading Client
//!
//! Connects to an exchange over a line-delimited JSON protocol and keeps:
//! - Per-symbol order books and signed positions
//! - A ledger of every order submitted, with unique ascending ids
//! - A sliding-window view of the outbound send rate
//! - Independent strategy timers driving pluggable decision logic
//!
//! # Architecture
//!
//! ```text
//!        Exchange (TCP)
//!            │ ▲
//!      ┌─────▼─┴─────┐
//!      │  Transport  │  ← line framing, read timeout
//!      └─────┬─▲─────┘
//!            │ │
//!      ┌─────▼─┴─────┐
//!      │    Codec    │  ← typed ServerMessage / ClientMessage
//!      └─────┬─▲─────┘
//!            │ │
//!   ┌────────┴─┴─────────┐
//!   │      Session       │──► RateGovernor
//!   └──┬──────────┬──▲───┘
//!      │          │  │ outbox
//! ┌────▼────┐ ┌───▼──┴────┐
//! │ Market  │ │ Scheduler │──► Strategies
//! │ State   │ └─────┬─────┘
//! └─────────┘  ┌────▼────┐
//!              │ Ledger  │
//!              └─────────┘
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod ledger;
pub mod market_state;
pub mod messages;
pub mod rate_governor;
pub mod scheduler;
pub mod session;
pub mod strategy;
pub mod transport;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
