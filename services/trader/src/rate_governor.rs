//! Outbound send-rate tracking
//!
//! Keeps the instants of the most recent sends in a fixed-capacity ring
//! buffer. When the buffer is full and its oldest entry lies inside the
//! trailing window, the client is sending faster than the exchange accepts
//! and will start having messages silently dropped.
//!
//! The governor is advisory: it never blocks, delays or drops a send.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the rate governor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// Number of sends tolerated inside one window.
    pub burst_capacity: usize,
    /// Length of the trailing window.
    #[serde(with = "millis")]
    pub window: Duration,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            burst_capacity: 500,
            window: Duration::from_secs(1),
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Sliding record of recent send instants.
#[derive(Debug, Clone)]
pub struct RateGovernor {
    window: VecDeque<Instant>,
    config: RateConfig,
    sends_recorded: u64,
}

impl RateGovernor {
    pub fn new(config: RateConfig) -> Self {
        debug!(
            burst_capacity = config.burst_capacity,
            window_ms = config.window.as_millis() as u64,
            "RateGovernor initialized"
        );
        Self {
            window: VecDeque::with_capacity(config.burst_capacity),
            config,
            sends_recorded: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RateConfig::default())
    }

    /// Record a send, evicting the oldest instant when at capacity.
    pub fn record_send(&mut self, now: Instant) {
        if self.config.burst_capacity == 0 {
            return;
        }
        if self.window.len() >= self.config.burst_capacity {
            self.window.pop_front();
        }
        self.window.push_back(now);
        self.sends_recorded += 1;
    }

    /// True when `burst_capacity` sends happened within the trailing window.
    pub fn should_warn(&self, now: Instant) -> bool {
        if self.config.burst_capacity == 0 || self.window.len() < self.config.burst_capacity {
            return false;
        }
        match self.window.front() {
            Some(oldest) => now.saturating_duration_since(*oldest) < self.config.window,
            None => false,
        }
    }

    /// Number of instants currently held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Total sends recorded since creation.
    pub fn sends_recorded(&self) -> u64 {
        self.sends_recorded
    }

    pub fn config(&self) -> &RateConfig {
        &self.config
    }
}
