use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tradebridge::config::BridgeConfig;
use tradebridge::ipc::EndpointIdentity;
use tradebridge::protocol::{Action, Update};
use tradebridge::trading::DecisionPeer;

#[derive(Parser)]
#[command(name = "bridge-monitor")]
#[command(about = "Attach to a running bridge session as a passive decision process")]
struct Cli {
    /// JSON config file (socket_dir, log_level)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the socket directory from the config
    #[arg(long)]
    socket_dir: Option<PathBuf>,

    /// Broker name of the session
    #[arg(long)]
    broker: String,

    /// Instrument symbol (e.g. EURUSD)
    #[arg(long)]
    instrument: String,

    /// Bar timeframe (e.g. Minute5)
    #[arg(long)]
    timeframe: String,

    /// Session instance id
    #[arg(long, default_value = "1")]
    instance: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    if let Some(dir) = cli.socket_dir {
        config.socket_dir = dir;
    }

    let level = config.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let identity = EndpointIdentity::new(cli.broker, cli.instrument, cli.timeframe, cli.instance)
        .context("Invalid session identity")?;
    let mut peer = DecisionPeer::connect(&config.socket_dir, &identity)
        .with_context(|| format!("Failed to connect to {}", identity))?;

    let stats = peer
        .serve(|updates: &[Update]| -> Vec<Action> {
            for update in updates {
                info!("{:?}", update);
            }
            Vec::new()
        })
        .context("Session ended with an error")?;

    info!(
        "session closed: {} bursts, {} updates",
        stats.bursts, stats.updates
    );
    Ok(())
}
