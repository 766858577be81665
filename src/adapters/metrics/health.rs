//! Health Check Routes - Liveness and Readiness Probes
//!
//! Exposes /live and /ready endpoints via axum 0.7 for container
//! health checks. Readiness follows the price feed: ready only while
//! the connection status is `Live`.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::sync::watch;

use crate::domain::status::ConnectionStatus;

/// Shared health state polled by readiness probes.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Price feed connection status.
    status: watch::Receiver<ConnectionStatus>,
}

impl HealthState {
    pub fn new(status: watch::Receiver<ConnectionStatus>) -> Self {
        Self { status }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Check if the client is receiving live prices.
    pub fn is_ready(&self) -> bool {
        self.status() == ConnectionStatus::Live
    }
}

/// Build the `/live` and `/ready` routes.
pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: returns 200 only while the feed is live.
async fn readiness(State(state): State<HealthState>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, "READY".to_string())
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("NOT READY ({})", state.status().label()),
        )
    }
}
