//! Session loop
//!
//! One [`Session`] is one connection from hello to close or failure. It owns
//! every piece of state: the channel, market state, order ledger, rate
//! governor and strategy scheduler. Each iteration reads one line, decodes
//! it, applies it to the state stores, polls the scheduler and flushes
//! whatever the strategies queued.

use std::time::Instant;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};
use types::ids::Symbol;
use types::numeric::Position;

use crate::codec;
use crate::config::ClientConfig;
use crate::error::{ExchangeSignal, SessionError};
use crate::ledger::OrderLedger;
use crate::market_state::MarketState;
use crate::messages::{ClientMessage, ServerMessage};
use crate::rate_governor::{RateConfig, RateGovernor};
use crate::scheduler::Scheduler;
use crate::transport::{Channel, TcpChannel};

/// Counters kept over the life of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub messages_received: u64,
    pub messages_sent: u64,
    pub fills: u64,
    pub rejects: u64,
    pub exchange_errors: u64,
    pub rate_warnings: u64,
}

/// Final state reported when the exchange closes the round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub stats: SessionStats,
    pub orders_submitted: usize,
    pub positions: Vec<(Symbol, Position)>,
    pub strategy_fires: Vec<(String, u64)>,
}

/// Outcome of processing one inbound line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Closed,
}

pub struct Session<R, W> {
    channel: Channel<R, W>,
    team: String,
    market: MarketState,
    ledger: OrderLedger,
    governor: RateGovernor,
    scheduler: Scheduler,
    outbox: Vec<ClientMessage>,
    stats: SessionStats,
    started: bool,
}

impl Session<tokio::net::tcp::OwnedReadHalf, tokio::net::tcp::OwnedWriteHalf> {
    /// Connect to the configured exchange.
    pub async fn connect(
        config: &ClientConfig,
        rate: RateConfig,
        scheduler: Scheduler,
    ) -> Result<Self, SessionError> {
        let channel = TcpChannel::connect(config).await?;
        Ok(Session::new(channel, config.team.clone(), rate, scheduler))
    }
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(channel: Channel<R, W>, team: String, rate: RateConfig, scheduler: Scheduler) -> Self {
        info!(team = %team, strategies = scheduler.len(), "Session created");
        Self {
            channel,
            team,
            market: MarketState::new(),
            ledger: OrderLedger::new(),
            governor: RateGovernor::new(rate),
            scheduler,
            outbox: Vec::new(),
            stats: SessionStats::default(),
            started: false,
        }
    }

    /// Send the hello handshake. Called once; later calls do nothing.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if self.started {
            return Ok(());
        }
        let hello = ClientMessage::Hello {
            team: self.team.clone(),
        };
        self.send(&hello).await?;
        self.channel.flush().await?;
        self.started = true;
        info!(team = %self.team, "Hello sent");
        Ok(())
    }

    /// Run until the exchange closes the round or a fatal error occurs.
    pub async fn run(&mut self) -> Result<SessionSummary, SessionError> {
        self.start().await?;
        loop {
            match self.step().await {
                Ok(Step::Continue) => {}
                Ok(Step::Closed) => break,
                Err(err) => {
                    error!(error = %err, received = self.stats.messages_received, "Session failed");
                    return Err(err);
                }
            }
        }
        let summary = self.summary();
        info!(
            received = summary.stats.messages_received,
            sent = summary.stats.messages_sent,
            orders = summary.orders_submitted,
            fills = summary.stats.fills,
            "Session closed"
        );
        Ok(summary)
    }

    /// Process one inbound line.
    pub async fn step(&mut self) -> Result<Step, SessionError> {
        let line = self.channel.receive_line().await?;
        let message: ServerMessage = codec::decode_bytes(&line)?;
        self.stats.messages_received += 1;

        if self.handle(&message)? == Step::Closed {
            return Ok(Step::Closed);
        }

        self.scheduler
            .poll(Instant::now(), &self.market, &mut self.ledger, &mut self.outbox)?;
        self.flush_outbox().await?;
        Ok(Step::Continue)
    }

    /// Apply an inbound message to the state stores.
    fn handle(&mut self, message: &ServerMessage) -> Result<Step, SessionError> {
        self.market.apply(message)?;
        self.ledger.apply(message);

        match message {
            ServerMessage::Hello { symbols } => {
                info!(symbols = symbols.len(), "Exchange hello received");
                for entry in symbols {
                    debug!(symbol = %entry.symbol, position = entry.position, "Reported position");
                }
            }
            ServerMessage::Open { symbols } => {
                info!(symbols = ?symbols, "Market open");
            }
            ServerMessage::Close { .. } => {
                info!("The round has ended");
                return Ok(Step::Closed);
            }
            ServerMessage::Fill {
                order_id,
                symbol,
                side,
                price,
                size,
            } => {
                self.stats.fills += 1;
                info!(
                    %order_id,
                    symbol = %symbol,
                    ?side,
                    price,
                    size,
                    position = self.market.position(symbol.as_str()),
                    "Fill"
                );
            }
            ServerMessage::Reject { order_id, error } => {
                self.stats.rejects += 1;
                self.signal(ExchangeSignal::Reject {
                    order_id: *order_id,
                    reason: error.clone(),
                });
            }
            ServerMessage::Error { error } => {
                self.stats.exchange_errors += 1;
                self.signal(ExchangeSignal::Error {
                    description: error.clone(),
                });
            }
            _ => {}
        }
        Ok(Step::Continue)
    }

    fn signal(&self, signal: ExchangeSignal) {
        warn!(signal = %signal, "Exchange signal");
    }

    /// Send everything the strategies queued, in queue order, then flush.
    async fn flush_outbox(&mut self) -> Result<(), SessionError> {
        if self.outbox.is_empty() {
            return Ok(());
        }
        let queued = std::mem::take(&mut self.outbox);
        for message in &queued {
            self.send(message).await?;
        }
        self.channel.flush().await?;
        Ok(())
    }

    async fn send(&mut self, message: &ClientMessage) -> Result<(), SessionError> {
        let line = codec::encode(message)?;
        self.channel.send_line(&line).await?;
        self.stats.messages_sent += 1;

        let now = Instant::now();
        self.governor.record_send(now);
        if self.governor.should_warn(now) {
            self.stats.rate_warnings += 1;
            warn!(
                kind = message.kind(),
                burst_capacity = self.governor.config().burst_capacity,
                "Send rate at exchange limit"
            );
        }
        Ok(())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            stats: self.stats.clone(),
            orders_submitted: self.ledger.order_count(),
            positions: self
                .market
                .positions()
                .map(|(symbol, position)| (symbol.clone(), position))
                .collect(),
            strategy_fires: self.scheduler.fire_counts(),
        }
    }

    pub fn market(&self) -> &MarketState {
        &self.market
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    pub fn governor(&self) -> &RateGovernor {
        &self.governor
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}
