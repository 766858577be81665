//! Trading API Port - Account Lookup and Trade Submission
//!
//! Contract for the trading aggregator the dashboard talks to. The
//! price feed core never retries or caches these calls; the price
//! board decides what to do with failures.

use async_trait::async_trait;

use crate::domain::account::{TradeRequest, TradeResponse, UserInformation};

/// Account and trade operations on the trading backend.
#[async_trait]
pub trait TradingApi: Send + Sync + 'static {
  /// Fetch balance and holdings for a user.
  async fn user_information(&self, user_id: u32) -> anyhow::Result<UserInformation>;

  /// Submit a buy or sell; returns the new balance and a confirmation.
  async fn trade(&self, request: &TradeRequest) -> anyhow::Result<TradeResponse>;
}
