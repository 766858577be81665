//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::{AppConfig, TransportKind};

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    transport = ?config.feed.transport,
    feed_url = %config.feed.url,
    user_id = config.client.user_id,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    config.client.user_id > 0,
    "client.user_id must be positive"
  );

  // Feed validation
  let feed = &config.feed;
  let schemes: &[&str] = match feed.transport {
    TransportKind::Websocket => &["ws://", "wss://"],
    TransportKind::Sse => &["http://", "https://"],
  };
  anyhow::ensure!(
    schemes.iter().any(|s| feed.url.starts_with(s)),
    "feed.url {:?} must start with one of {:?} for {:?} transport",
    feed.url,
    schemes,
    feed.transport
  );
  anyhow::ensure!(
    feed.connect_timeout_ms > 0,
    "feed.connect_timeout_ms must be positive"
  );
  anyhow::ensure!(
    feed.channel_capacity > 0,
    "feed.channel_capacity must be positive"
  );

  // API validation
  anyhow::ensure!(
    !config.api.base_url.is_empty(),
    "Trading API base_url must not be empty"
  );
  anyhow::ensure!(
    !config.api.directory_url.is_empty(),
    "Directory API URL must not be empty"
  );
  anyhow::ensure!(config.api.timeout_ms > 0, "api.timeout_ms must be positive");

  // Metrics validation
  if config.metrics.enabled {
    config
      .metrics
      .bind_address
      .parse::<SocketAddr>()
      .with_context(|| format!("Invalid metrics.bind_address: {}", config.metrics.bind_address))?;
  }

  Ok(())
}
