//! Collaborator API Request/Response Types
//!
//! Wire shapes of the trading aggregator. They are kept apart from the
//! domain records so unknown ticker symbols can be dropped at the edge.

use serde::Deserialize;
use tracing::warn;

use crate::domain::account::{Holding, TradeResponse, UserInformation};
use crate::domain::ticker::Ticker;

/// Holding as sent by the aggregator.
#[derive(Debug, Clone, Deserialize)]
pub struct WireHolding {
  pub ticker: String,
  pub quantity: u32,
}

/// `GET /user/{id}` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUserInformation {
  #[serde(default)]
  pub user_id: Option<u32>,
  pub name: String,
  pub balance: f64,
  #[serde(default)]
  pub holdings: Vec<WireHolding>,
  #[serde(default)]
  pub employee_id: Option<u32>,
  #[serde(default)]
  pub department_id: Option<u32>,
}

impl WireUserInformation {
  /// Convert to the domain record, dropping holdings of untracked tickers.
  pub fn into_domain(self) -> UserInformation {
    let holdings = self
      .holdings
      .into_iter()
      .filter_map(|h| match h.ticker.parse::<Ticker>() {
        Ok(ticker) => Some(Holding {
          ticker,
          quantity: h.quantity,
        }),
        Err(e) => {
          warn!(error = %e, quantity = h.quantity, "Dropping holding with unknown ticker");
          None
        }
      })
      .collect();

    UserInformation {
      user_id: self.user_id,
      name: self.name,
      balance: self.balance,
      holdings,
      employee_id: self.employee_id,
      department_id: self.department_id,
    }
  }
}

/// `POST /trade` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTradeResponse {
  #[serde(default)]
  pub user_id: Option<u32>,
  pub ticker: String,
  pub action: String,
  pub price: f64,
  #[serde(default)]
  pub quantity: Option<u32>,
  #[serde(default)]
  pub total_price: Option<f64>,
  #[serde(default)]
  pub balance: Option<f64>,
}

impl WireTradeResponse {
  /// Confirmation in the `ACTION TICKER @ $price` form.
  pub fn into_domain(self) -> TradeResponse {
    TradeResponse {
      balance: self.balance,
      message: Some(format!("{} {} @ ${}", self.action, self.ticker, self.price)),
    }
  }
}
