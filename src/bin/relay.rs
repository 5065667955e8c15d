//! OSC Timecode Relay
//!
//! Listens for OSC on UDP and pushes time and transport state to browser
//! viewers. Optional first argument: path to a TOML config file.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use osc_timecode_relay::{
    config::AppConfig,
    network::{local_ipv4_addresses, OscListener},
    ui::WebServer,
    Relay,
};

async fn stopped(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OSC timecode relay");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    if config.transport.reset_on_stop {
        tracing::info!("Timecode resets to 00:00:00 on /stop");
    }

    let relay = Arc::new(Relay::from_config(&config));
    let listener = OscListener::bind(&config.osc)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let web_server = WebServer::new(config.ui.clone(), relay.clone(), listener.stats());
    let web_handle = web_server.start_background(stopped(shutdown_rx.clone()));

    for ip in local_ipv4_addresses() {
        tracing::info!("connect to: http://{}:{}", ip, config.ui.http_port);
    }

    let osc_handle = tokio::spawn(listener.run(relay, stopped(shutdown_rx)));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    let _ = shutdown_tx.send(true);

    osc_handle.await??;
    web_handle.await??;

    Ok(())
}
