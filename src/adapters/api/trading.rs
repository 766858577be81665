//! Trading Aggregator Adapter
//!
//! Implements the `TradingApi` port over the aggregator's REST
//! endpoints using the shared `ApiClient`.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, instrument};

use super::client::ApiClient;
use super::types::{WireTradeResponse, WireUserInformation};
use crate::domain::account::{TradeRequest, TradeResponse, UserInformation};
use crate::ports::trading_api::TradingApi;

pub struct HttpTradingApi {
  client: Arc<ApiClient>,
}

impl HttpTradingApi {
  pub fn new(client: Arc<ApiClient>) -> Self {
    Self { client }
  }
}

#[async_trait]
impl TradingApi for HttpTradingApi {
  #[instrument(skip(self))]
  async fn user_information(&self, user_id: u32) -> Result<UserInformation> {
    let wire: WireUserInformation = self.client.get_json(&format!("/user/{user_id}")).await?;
    Ok(wire.into_domain())
  }

  #[instrument(skip(self), fields(ticker = %request.ticker, action = %request.action))]
  async fn trade(&self, request: &TradeRequest) -> Result<TradeResponse> {
    let wire: WireTradeResponse = self.client.post_json("/trade", request).await?;
    let response = wire.into_domain();
    info!(
      message = response.message.as_deref().unwrap_or_default(),
      balance = ?response.balance,
      "Trade executed"
    );
    Ok(response)
  }
}
