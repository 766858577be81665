//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml`. Endpoints,
//! the transport choice and the trading user are externalized here;
//! the retry policy is fixed in the domain layer.

pub mod loader;

use serde::Deserialize;

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Client identity and logging.
  pub client: ClientConfig,
  /// Streaming price feed.
  pub feed: FeedConfig,
  /// Trading aggregator and directory endpoints.
  pub api: ApiConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Client identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
  /// Human-readable client name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Trading user whose portfolio is shown.
  #[serde(default = "default_user_id")]
  pub user_id: u32,
}

/// Which transport carries the price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
  Websocket,
  Sse,
}

/// Price feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
  /// Transport used to open sessions.
  #[serde(default = "default_transport")]
  pub transport: TransportKind,
  /// Feed endpoint (`ws://`/`wss://` or `http://`/`https://` for SSE).
  pub url: String,
  /// Timeout for a single session open (milliseconds).
  #[serde(default = "default_connect_timeout")]
  pub connect_timeout_ms: u64,
  /// Buffered events between the supervisor and its consumer.
  #[serde(default = "default_channel_capacity")]
  pub channel_capacity: usize,
}

/// HTTP collaborator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Trading aggregator base URL.
  pub base_url: String,
  /// Employee directory base URL.
  pub directory_url: String,
  /// Request timeout in milliseconds.
  #[serde(default = "default_timeout")]
  pub timeout_ms: u64,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable the Prometheus / health server.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: default_true(),
      bind_address: default_metrics_addr(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_user_id() -> u32 {
  1
}

fn default_transport() -> TransportKind {
  TransportKind::Websocket
}

fn default_connect_timeout() -> u64 {
  5_000
}

fn default_channel_capacity() -> usize {
  1_024
}

fn default_timeout() -> u64 {
  10_000
}

fn default_true() -> bool {
  true
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}
