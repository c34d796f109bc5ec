//! hidbridged: UDP command to USB HID report bridge

#![deny(clippy::unwrap_used)]

use anyhow::{Context, Result};
use clap::Parser;
use hidbridge_service::{
    Bridge, BridgeConfig, Cli, capture_from_config, logging, sink_from_config,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", BridgeConfig::default().to_yaml()?);
        return Ok(());
    }

    let config = cli.resolve_config()?;
    logging::init(&config.logging.level)?;
    info!("Starting hidbridged v{}", env!("CARGO_PKG_VERSION"));

    let sink = sink_from_config(&config.output).await?;
    let capture = capture_from_config(&config.capture, config.network.listen_addr).await?;
    let bridge = Bridge::new(config, sink, capture)
        .await
        .context("Failed to start bridge")?;

    let stats = bridge.run_until(shutdown_signal()).await;
    info!(
        ticks = stats.ticks,
        frames = stats.frames,
        send_failures = stats.send_failures,
        "hidbridged stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
