//! Trading account types and valuation.
//!
//! Mirrors the records exchanged with the trading aggregator: user
//! information with holdings, trade requests and their confirmations.
//! Balance arithmetic for settlement lives server-side; this module only
//! values holdings against the latest known prices.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ticker::{PriceSnapshot, Ticker, TickerMap};

/// Fallback trade price when no live price is known for a ticker.
pub const DEFAULT_TRADE_PRICE: u32 = 100;

/// A position in one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: Ticker,
    pub quantity: u32,
}

/// Account information for a trading user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInformation {
    #[serde(default)]
    pub user_id: Option<u32>,
    pub name: String,
    pub balance: f64,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    /// Links to the employee directory, when present.
    #[serde(default)]
    pub employee_id: Option<u32>,
    #[serde(default)]
    pub department_id: Option<u32>,
}

impl UserInformation {
    /// Quantity held per ticker, zero for tickers not held.
    pub fn holdings_by_ticker(&self) -> TickerMap<u32> {
        let mut map = TickerMap::default();
        for h in &self.holdings {
            map.set(h.ticker, h.quantity);
        }
        map
    }
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A trade submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub user_id: u32,
    pub ticker: Ticker,
    pub action: TradeAction,
    pub quantity: u32,
    pub price: u32,
}

/// Confirmation of an executed trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeResponse {
    pub balance: Option<f64>,
    pub message: Option<String>,
}

// ────────────────────────────────────────────
// Price table
// ────────────────────────────────────────────

/// Long-lived last-known price per ticker.
///
/// Snapshots supersede each other; the table is where they are merged
/// so valuation always has the most recent complete round.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    prices: TickerMap<Option<f64>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, snapshot: &PriceSnapshot) {
        for (ticker, price) in snapshot.prices().iter() {
            self.prices.set(ticker, Some(*price));
        }
    }

    pub fn price(&self, ticker: Ticker) -> Option<f64> {
        *self.prices.get(ticker)
    }

    /// Price handed to trade submission: rounded live price or the default.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn trade_price(&self, ticker: Ticker) -> u32 {
        self.price(ticker)
            .map_or(DEFAULT_TRADE_PRICE, |p| p.round().min(f64::from(u32::MAX)) as u32)
    }

    /// Cash balance plus holdings valued at known prices (unknown = 0).
    pub fn portfolio_value(&self, user: &UserInformation) -> f64 {
        let holdings: f64 = user
            .holdings
            .iter()
            .map(|h| f64::from(h.quantity) * self.price(h.ticker).unwrap_or(0.0))
            .sum();
        holdings + user.balance
    }
}
