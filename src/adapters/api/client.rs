//! JSON HTTP Client - Shared REST Client for Collaborators
//!
//! Wraps reqwest with a request timeout and uniform status handling.
//! Calls are never retried here; failures surface to the caller.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Configuration for the JSON HTTP client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
  /// Base URL, without trailing slash.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
}

impl Default for ApiClientConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:8080".to_string(),
      timeout: Duration::from_secs(10),
    }
  }
}

/// JSON client bound to one base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
  http: Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(config: ApiClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').to_string(),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// GET `path` and decode the JSON body.
  pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let request = self.http.get(self.url(path));
    self.execute(request, "GET", path).await
  }

  /// POST `body` as JSON to `path` and decode the JSON reply.
  pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
  where
    B: Serialize + Sync,
    T: DeserializeOwned,
  {
    let request = self.http.post(self.url(path)).json(body);
    self.execute(request, "POST", path).await
  }

  async fn execute<T: DeserializeOwned>(
    &self,
    request: RequestBuilder,
    method: &str,
    path: &str,
  ) -> Result<T> {
    debug!(method, path, "HTTP request");

    let response = request
      .send()
      .await
      .with_context(|| format!("{method} {path} failed"))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      warn!(method, path, status = %status, "HTTP request rejected");
      anyhow::bail!("API error {status}: {body}");
    }

    response
      .json::<T>()
      .await
      .with_context(|| format!("Failed to decode {method} {path} response"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_trailing_slash_trimmed() {
    let client = ApiClient::new(ApiClientConfig {
      base_url: "http://localhost:8080/".to_string(),
      ..Default::default()
    })
    .unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
    assert_eq!(client.url("/user/1"), "http://localhost:8080/user/1");
  }

  #[tokio::test]
  async fn test_unreachable_host_is_error() {
    let client = ApiClient::new(ApiClientConfig {
      base_url: "http://127.0.0.1:9".to_string(),
      timeout: Duration::from_millis(500),
    })
    .unwrap();
    let result: Result<serde_json::Value> = client.get_json("/user/1").await;
    assert!(result.is_err());
  }
}
