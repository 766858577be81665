//! Price Feed Transports - Streaming Price Sessions
//!
//! Implementations of the `PriceTransport` port:
//! - WebSocket: JSON text frames (primary)
//! - SSE: `text/event-stream` from the aggregator
//! - Replay: scripted sessions for tests and offline runs

pub mod replay;
pub mod sse;
pub mod websocket;
pub mod wire;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

pub use replay::{ReplayScript, ReplayStep, ReplayTransport};
pub use sse::SseTransport;
pub use websocket::WebSocketTransport;

use crate::config::{FeedConfig, TransportKind};
use crate::ports::price_feed::PriceTransport;

/// Build the transport selected in the feed configuration.
pub fn build_transport(config: &FeedConfig) -> Result<Arc<dyn PriceTransport>> {
    let timeout = Duration::from_millis(config.connect_timeout_ms);
    let transport: Arc<dyn PriceTransport> = match config.transport {
        TransportKind::Websocket => Arc::new(WebSocketTransport::new(&config.url, timeout)),
        TransportKind::Sse => Arc::new(SseTransport::new(&config.url, timeout)?),
    };
    Ok(transport)
}
