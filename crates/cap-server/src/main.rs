use std::path::PathBuf;

use anyhow::Context;
use cap_core::CapibaraConfig;
use cap_server::{app_with_state, state::AppState};
use clap::Parser;
use tracing::info;

/// Capibara6 inference gateway.
#[derive(Debug, Parser)]
#[command(name = "capibara6-server", version)]
struct Args {
    /// JSON configuration file.
    #[arg(long, env = "CAPIBARA_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => CapibaraConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => CapibaraConfig::default(),
    };
    config.apply_env()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let state = AppState::from_config(&config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, models = config.models.len(), fallback = config.fallback.enabled, "capibara6 gateway listening");

    axum::serve(listener, app_with_state(state)).await?;
    Ok(())
}
