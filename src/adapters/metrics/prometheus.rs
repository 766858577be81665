//! Prometheus Metrics Registry - Price Feed Observability
//!
//! Registers the client's metrics and serves them on `/metrics`
//! together with the health probes. Covers feed status, event
//! throughput, reconnects and portfolio value.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use prometheus::{Encoder, Gauge, IntCounter, IntGaugeVec, Opts, Registry, TextEncoder};
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use super::health::{self, HealthState};
use crate::domain::status::ConnectionStatus;

/// Centralized Prometheus metrics for the client.
///
/// All metrics follow the naming convention `stock_feed_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Connection status, one-hot over the `status` label.
    pub feed_status: IntGaugeVec,
    /// Price events received from the supervised feed.
    pub price_events: IntCounter,
    /// Complete snapshots emitted by the coalescer.
    pub snapshots: IntCounter,
    /// Transitions into `Reconnecting`.
    pub reconnect_attempts: IntCounter,
    /// Cash plus holdings at the last known prices.
    pub portfolio_value: Gauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let feed_status = IntGaugeVec::new(
            Opts::new(
                "stock_feed_status",
                "Price feed connection status (1 for the current status)",
            ),
            &["status"],
        )?;

        let price_events = IntCounter::new(
            "stock_feed_price_events_total",
            "Price events received from the feed",
        )?;

        let snapshots = IntCounter::new(
            "stock_feed_snapshots_total",
            "Complete price snapshots emitted",
        )?;

        let reconnect_attempts = IntCounter::new(
            "stock_feed_reconnect_attempts_total",
            "Times the feed entered the reconnecting state",
        )?;

        let portfolio_value = Gauge::new(
            "stock_feed_portfolio_value",
            "User cash balance plus holdings at last known prices",
        )?;

        // Register all metrics
        registry.register(Box::new(feed_status.clone()))?;
        registry.register(Box::new(price_events.clone()))?;
        registry.register(Box::new(snapshots.clone()))?;
        registry.register(Box::new(reconnect_attempts.clone()))?;
        registry.register(Box::new(portfolio_value.clone()))?;

        let metrics = Self {
            registry,
            feed_status,
            price_events,
            snapshots,
            reconnect_attempts,
            portfolio_value,
        };
        metrics.observe_status(ConnectionStatus::Disconnected);
        Ok(metrics)
    }

    /// Record a status change.
    pub fn observe_status(&self, status: ConnectionStatus) {
        for candidate in ConnectionStatus::ALL {
            self.feed_status
                .with_label_values(&[candidate.as_str()])
                .set(i64::from(candidate == status));
        }
        if status == ConnectionStatus::Reconnecting {
            self.reconnect_attempts.inc();
        }
    }

    /// Render all metrics in the Prometheus text format.
    pub fn encode(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not UTF-8")
    }

    /// Serve `/metrics`, `/live` and `/ready` on the configured bind address.
    #[instrument(skip(self, health, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        health: HealthState,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new()
            .route(
                "/metrics",
                get(move || {
                    let metrics = Arc::clone(&metrics_self);
                    async move {
                        match metrics.encode() {
                            Ok(body) => (StatusCode::OK, body),
                            Err(e) => {
                                error!(error = %e, "Metrics scrape failed");
                                (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                            }
                        }
                    }
                }),
            )
            .merge(health::router(health));

        let listener = tokio::net::TcpListener::bind(&bind_address)
            .await
            .with_context(|| format!("Failed to bind metrics server on {bind_address}"))?;
        info!(address = %bind_address, "Metrics and health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        info!("Metrics and health server stopped");
        Ok(())
    }
}
