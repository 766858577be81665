//! Stock Feed Client - Entry Point
//!
//! Wiring sequence:
//! 1. Load config.toml (or the path given as first argument) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Build the configured price transport and stream supervisor
//! 4. Create HTTP collaborators and the price board
//! 5. Spawn metrics / health server
//! 6. Subscribe, load the user, consume snapshots until SIGINT
//! 7. Cancel the subscription (status -> Disconnected), stop the server

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use stock_feed_client::adapters::api::{ApiClient, ApiClientConfig, HttpDirectoryApi, HttpTradingApi};
use stock_feed_client::adapters::feeds::build_transport;
use stock_feed_client::adapters::metrics::{HealthState, MetricsRegistry};
use stock_feed_client::config;
use stock_feed_client::usecases::{PriceBoard, SnapshotEvent, SnapshotFeed, StreamSupervisor};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.client.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.client.name,
        version = env!("CARGO_PKG_VERSION"),
        transport = ?config.feed.transport,
        user_id = config.client.user_id,
        "Starting stock feed client"
    );

    // ── 3. Price transport + supervisor ─────────────────────
    let transport = build_transport(&config.feed).context("Failed to build price transport")?;
    let supervisor = StreamSupervisor::new(transport).with_channel_capacity(config.feed.channel_capacity);

    // ── 4. HTTP collaborators + price board ─────────────────
    let timeout = Duration::from_millis(config.api.timeout_ms);
    let trading_client = Arc::new(
        ApiClient::new(ApiClientConfig {
            base_url: config.api.base_url.clone(),
            timeout,
        })
        .context("Failed to create trading API client")?,
    );
    let directory_client = Arc::new(
        ApiClient::new(ApiClientConfig {
            base_url: config.api.directory_url.clone(),
            timeout,
        })
        .context("Failed to create directory client")?,
    );
    let mut board = PriceBoard::new(
        Arc::new(HttpTradingApi::new(trading_client)),
        Arc::new(HttpDirectoryApi::new(directory_client)),
        config.client.user_id,
    );

    // ── 5. Metrics / health server ──────────────────────────
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to create metrics registry")?);
    let server_handle = if config.metrics.enabled {
        let server = Arc::clone(&metrics).serve(
            config.metrics.bind_address.clone(),
            HealthState::new(supervisor.status()),
            shutdown_tx.subscribe(),
        );
        Some(tokio::spawn(async move {
            if let Err(e) = server.await {
                error!(error = %e, "Metrics server failed");
            }
        }))
    } else {
        None
    };

    // ── 6. Subscribe and consume ────────────────────────────
    let subscription = supervisor.subscribe().context("Failed to subscribe to price feed")?;
    let mut feed = SnapshotFeed::new(subscription).with_price_counter(metrics.price_events.clone());

    // Notices are logged by the board when raised.
    board.refresh_user().await;
    metrics.portfolio_value.set(board.portfolio_value());

    loop {
        tokio::select! {
            biased;
            _ = signal::ctrl_c() => {
                info!("SIGINT received, initiating graceful shutdown");
                break;
            }
            event = feed.next() => match event {
                Some(SnapshotEvent::Status(status)) => {
                    metrics.observe_status(status);
                    board.on_status(status);
                }
                Some(SnapshotEvent::Snapshot(snapshot)) => {
                    metrics.snapshots.inc();
                    board.apply_snapshot(&snapshot);
                    metrics.portfolio_value.set(board.portfolio_value());
                    info!(
                        completed_at = %snapshot.completed_at(),
                        portfolio_value = board.portfolio_value(),
                        "Price snapshot"
                    );
                }
                None => {
                    warn!("Price feed ended unexpectedly");
                    break;
                }
            }
        }
    }

    // ── 7. Graceful shutdown ────────────────────────────────
    feed.cancel().await;
    metrics.observe_status(supervisor.current_status());
    let _ = shutdown_tx.send(());
    if let Some(handle) = server_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}
