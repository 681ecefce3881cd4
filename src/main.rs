//! jarvis_satellite
//!
//! Serves Wyoming satellite events and drives the ReSpeaker XVF3800 LED ring
//! through the `xvf_host` tool.

use clap::Parser;
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// CLI definitions
mod cli;
use cli::Cli;

use jarvis_satellite::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("jarvis_satellite={level}").parse()?)
                .add_directive(format!("wyoming_transport={level}").parse()?),
        )
        .init();
    debug!("{:?}", cli);

    info!("Ready");

    // Ctrl-C / SIGTERM end the accept loop; the LEDs are turned off on the way out
    let (stop_tx, mut stop_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(true);
    })?;
    let shutdown = async move {
        let _ = stop_rx.wait_for(|&stop| stop).await;
        info!("Shutting down");
    };

    server::run(&(&cli).into(), shutdown).await?;
    Ok(())
}
