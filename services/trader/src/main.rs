use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;

use trader::config::{ClientConfig, ExchangeTarget, TestExchange, TraderConfig, DEFAULT_TEAM};
use trader::session::Session;

#[derive(Parser, Debug)]
#[command(name = "trader", version, about = "Exchange trading client")]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,

    /// Team name sent in the hello handshake
    #[arg(long, default_value = DEFAULT_TEAM)]
    team: String,

    /// JSON file with rate and strategy settings
    #[arg(long, value_name = "FILE")]
    strategy_config: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// Connect to the production exchange
    #[arg(long)]
    production: bool,

    /// Connect to a test exchange
    #[arg(long, value_enum, value_name = "ENV")]
    test: Option<TestExchange>,

    /// Connect to an explicit address
    #[arg(long, value_name = "HOST:PORT")]
    specific_address: Option<String>,
}

impl TargetArgs {
    fn resolve(&self) -> anyhow::Result<ExchangeTarget> {
        if let Some(address) = &self.specific_address {
            return Ok(ExchangeTarget::parse_address(address)?);
        }
        if let Some(env) = self.test {
            return Ok(ExchangeTarget::Test(env));
        }
        Ok(ExchangeTarget::Production)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let target = cli.target.resolve()?;
    let client = ClientConfig::for_target(&target, &cli.team);

    let trader_config = match &cli.strategy_config {
        Some(path) => TraderConfig::from_json_file(path)?,
        None => TraderConfig::default(),
    };

    tracing::info!(
        addr = %client.address(),
        team = %client.team,
        version = trader::SERVICE_VERSION,
        "Starting trading client"
    );

    let scheduler = trader_config.strategies.build_scheduler(Instant::now());
    let mut session = Session::connect(&client, trader_config.rate.clone(), scheduler)
        .await
        .with_context(|| format!("connecting to {}", client.address()))?;

    let summary = session.run().await?;
    tracing::info!(summary = %serde_json::to_string(&summary)?, "Round complete");

    Ok(())
}
