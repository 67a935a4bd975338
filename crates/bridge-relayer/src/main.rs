use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bridge_relayer::chains::{Chain, EvmChain};
use bridge_relayer::config::RelayerConfig;
use bridge_relayer::metrics::RelayerMetrics;
use bridge_relayer::relay::{RelayPipeline, RoutingTable};

#[derive(Parser)]
#[command(name = "relayer")]
#[command(about = "Deposit bridge relayer between two EVM networks")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/relayer.toml")]
    pub config: String,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start both relay pipelines
    Start,
    /// Check connectivity to both configured networks
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("bridge_relayer={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayerConfig::load(&cli.config)?;
    info!("loaded configuration from {}", cli.config);

    match cli.command {
        Commands::Start => start_relayer(config).await?,
        Commands::Status => show_status(&config).await?,
    }

    Ok(())
}

async fn connect_chains(
    config: &RelayerConfig,
) -> anyhow::Result<(Arc<dyn Chain>, Arc<dyn Chain>)> {
    let signing_key = config.signing_key()?;
    let ((name_a, cfg_a), (name_b, cfg_b)) = config.chain_pair()?;

    let chain_a = EvmChain::connect(name_a, cfg_a, &signing_key)
        .await
        .with_context(|| format!("connecting to {name_a}"))?;
    let chain_b = EvmChain::connect(name_b, cfg_b, &signing_key)
        .await
        .with_context(|| format!("connecting to {name_b}"))?;

    Ok((Arc::new(chain_a), Arc::new(chain_b)))
}

async fn start_relayer(config: RelayerConfig) -> anyhow::Result<()> {
    let metrics = Arc::new(RelayerMetrics::new()?);
    let (chain_a, chain_b) = connect_chains(&config).await?;
    let table = RoutingTable::for_pair(chain_a.clone(), chain_b.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut pipelines = Vec::new();
    for source in [chain_a, chain_b] {
        let route = table
            .route_for(source.chain_id())
            .context("no route for configured chain")?
            .clone();
        let name = source.name().to_string();
        let pipeline =
            RelayPipeline::new(source, route, metrics.clone(), shutdown_rx.clone());
        pipelines.push(tokio::spawn(async move {
            if let Err(e) = pipeline.run().await {
                error!(chain = %name, error = %e, "relay pipeline exited");
            }
        }));
    }
    info!("relay pipelines running on both networks");

    tokio::signal::ctrl_c().await?;
    info!("shutting down relayer");
    let _ = shutdown_tx.send(true);
    for pipeline in pipelines {
        let _ = pipeline.await;
    }

    Ok(())
}

async fn show_status(config: &RelayerConfig) -> anyhow::Result<()> {
    let (chain_a, chain_b) = connect_chains(config).await?;
    for chain in [chain_a, chain_b] {
        match chain.latest_height().await {
            Ok(height) => info!(chain = %chain.name(), height, "chain reachable"),
            Err(e) => error!(chain = %chain.name(), error = %e, "chain unreachable"),
        }
    }
    Ok(())
}
