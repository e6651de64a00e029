//! Oud Rewards — loyalty program engine for the oud retail ERP.
//!
//! Main entry point: loads configuration, wires the tier catalog, store,
//! and transaction processor, and starts the HTTP server.

use clap::Parser;
use rewards_api::handlers::LoyaltyState;
use rewards_api::ApiServer;
use rewards_core::config::AppConfig;
use rewards_core::tiers::TierCatalog;
use rewards_engine::processor::TransactionProcessor;
use rewards_store::InMemoryStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "oud-rewards")]
#[command(about = "Loyalty program engine for the oud retail ERP")]
#[command(version)]
struct Cli {
    /// HTTP port (overrides config)
    #[arg(long, env = "OUD_REWARDS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Metrics port (overrides config)
    #[arg(long, env = "OUD_REWARDS__METRICS__PORT")]
    metrics_port: Option<u16>,

    /// Start with an empty store instead of seeded demo customers
    #[arg(long, default_value_t = false)]
    no_demo_data: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oud_rewards=info,rewards_api=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Oud Rewards starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(port) = cli.metrics_port {
        config.metrics.port = port;
    }

    info!(
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        program = %config.program.name,
        "Configuration loaded"
    );

    let catalog = Arc::new(TierCatalog::standard());
    let store = Arc::new(if cli.no_demo_data {
        InMemoryStore::empty()
    } else {
        InMemoryStore::new()
    });
    let processor = Arc::new(TransactionProcessor::new(
        catalog.clone(),
        store.clone(),
        config.program.clone(),
    ));

    let state = LoyaltyState {
        processor,
        store,
        catalog,
        program: config.program.clone(),
        start_time: Instant::now(),
    };

    let server = ApiServer::new(config, state);

    if let Err(e) = server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    server.start_http().await?;

    Ok(())
}
