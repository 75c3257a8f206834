//! bidlens service entry point.
//!
//! Connects to the in-page shim over WebSocket and runs the collector
//! service against it: the bridge plays auction provider, ad server and
//! snapshot sink all at once.

use anyhow::Result;
use collector::service::{CollectorConfig, CollectorService};
use metrics_exporter_prometheus::PrometheusBuilder;
use page_bridge::WsPageBridge;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default shim endpoint; the in-page shim listens on localhost.
const DEFAULT_BRIDGE_URL: &str = "ws://127.0.0.1:8777/bridge";

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting bidlens...");

    // Initialize Prometheus metrics exporter
    let metrics_port: u16 = env_or("METRICS_PORT", 9090);
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], metrics_port))
        .install()?;
    info!(
        "Prometheus metrics available at http://0.0.0.0:{}/metrics",
        metrics_port
    );

    let bridge_url =
        std::env::var("BRIDGE_URL").unwrap_or_else(|_| DEFAULT_BRIDGE_URL.to_string());
    let poll_interval = Duration::from_millis(env_or("POLL_INTERVAL_MS", 500));

    let (bridge, channels) = WsPageBridge::connect(&bridge_url).await?;
    info!("bridge connected, starting collector");

    let service = CollectorService::new(
        bridge.clone(),
        bridge.clone(),
        bridge,
        CollectorConfig { poll_interval },
        channels.page_events_rx,
        channels.command_rx,
    );
    let handle = tokio::spawn(service.run());

    tokio::select! {
        result = handle => match result {
            Ok(Ok(())) => info!("collector service exited"),
            Ok(Err(error)) => error!(%error, "collector service failed"),
            Err(error) => error!(%error, "collector task panicked"),
        },
        _ = tokio::signal::ctrl_c() => info!("interrupt received, shutting down"),
    }

    Ok(())
}
