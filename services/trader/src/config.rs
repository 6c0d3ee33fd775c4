//! Client configuration
//!
//! Resolves the exchange target (production, a named test environment, or
//! an explicit `HOST:PORT`) into connection settings, and loads the trading
//! configuration (rate limits and strategy parameters) from JSON.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::rate_governor::RateConfig;
use crate::scheduler::Scheduler;
use crate::strategy::{
    FairValueArbitrage, FairValueConfig, InventoryBalancer, InventoryConfig, PennyConfig, PennyQuoter,
};

pub const DEFAULT_TEAM: &str = "TABLETURNERS";
pub const PRODUCTION_HOST: &str = "production";
pub const BASE_PORT: u16 = 25000;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid address {0:?}: expected HOST:PORT")]
    InvalidAddress(String),

    #[error("invalid port in {0:?}")]
    InvalidPort(String),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Named test exchanges, each on a fixed offset from the base port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TestExchange {
    #[value(name = "prod-like")]
    ProdLike,
    Slower,
    /// Never sends any data
    Empty,
}

impl TestExchange {
    pub fn port_offset(&self) -> u16 {
        match self {
            TestExchange::ProdLike => 0,
            TestExchange::Slower => 1,
            TestExchange::Empty => 2,
        }
    }
}

/// Which exchange to connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeTarget {
    Production,
    Test(TestExchange),
    Specific { host: String, port: u16 },
}

impl ExchangeTarget {
    /// Parse a `HOST:PORT` override.
    pub fn parse_address(address: &str) -> Result<Self, ConfigError> {
        let (host, port) = address
            .rsplit_once(':')
            .filter(|(host, _)| !host.is_empty())
            .ok_or_else(|| ConfigError::InvalidAddress(address.to_string()))?;
        let port = port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(address.to_string()))?;
        Ok(ExchangeTarget::Specific {
            host: host.to_string(),
            port,
        })
    }

    pub fn host(&self, team: &str) -> String {
        match self {
            ExchangeTarget::Production => PRODUCTION_HOST.to_string(),
            ExchangeTarget::Test(_) => format!("test-exch-{}", team),
            ExchangeTarget::Specific { host, .. } => host.clone(),
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            ExchangeTarget::Production => BASE_PORT,
            ExchangeTarget::Test(env) => BASE_PORT + env.port_offset(),
            ExchangeTarget::Specific { port, .. } => *port,
        }
    }

    /// The empty test exchange never sends, so a read timeout would always
    /// trip there.
    pub fn uses_read_timeout(&self) -> bool {
        !matches!(self, ExchangeTarget::Test(TestExchange::Empty))
    }
}

/// Connection settings consumed by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Identifier sent in the hello record
    pub team: String,
    pub connect_timeout: Duration,
    /// Liveness guard on reads; `None` waits forever
    pub read_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn for_target(target: &ExchangeTarget, team: &str) -> Self {
        let team = team.to_uppercase();
        Self {
            host: target.host(&team),
            port: target.port(),
            team,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: target.uses_read_timeout().then_some(DEFAULT_READ_TIMEOUT),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Strategy selection; `null` in JSON disables a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub penny: Option<PennyConfig>,
    pub fair_value: Option<FairValueConfig>,
    pub inventory: Option<InventoryConfig>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            penny: Some(PennyConfig::default()),
            fair_value: Some(FairValueConfig::default()),
            inventory: Some(InventoryConfig::default()),
        }
    }
}

impl StrategyConfig {
    /// Register every enabled strategy on a fresh scheduler.
    pub fn build_scheduler(&self, now: Instant) -> Scheduler {
        let mut scheduler = Scheduler::new();
        if let Some(penny) = &self.penny {
            scheduler.register(penny.interval(), Box::new(PennyQuoter::new(penny.clone())), now);
        }
        if let Some(fair_value) = &self.fair_value {
            scheduler.register(
                fair_value.interval(),
                Box::new(FairValueArbitrage::new(fair_value.clone())),
                now,
            );
        }
        if let Some(inventory) = &self.inventory {
            scheduler.register(
                inventory.interval(),
                Box::new(InventoryBalancer::new(inventory.clone())),
                now,
            );
        }
        scheduler
    }
}

/// Trading configuration loaded from an optional JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraderConfig {
    pub rate: RateConfig,
    pub strategies: StrategyConfig,
}

impl TraderConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded trader config");
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
