//! Ticker universe and price value types.
//!
//! The tracked instrument set is closed and known at compile time.
//! Every collection keyed by ticker is a `TickerMap`, a fixed array
//! indexed by `Ticker::index`, so "has an entry for every ticker" is
//! a property of the type rather than a runtime check on a hash map.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of tracked instruments.
pub const TICKER_COUNT: usize = 4;

/// A tracked stock instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ticker {
    Apple,
    Amazon,
    Google,
    Microsoft,
}

impl Ticker {
    /// All tickers in stable feed order.
    pub const ALL: [Self; TICKER_COUNT] = [Self::Apple, Self::Amazon, Self::Google, Self::Microsoft];

    /// Position of this ticker inside a `TickerMap`.
    pub const fn index(self) -> usize {
        match self {
            Self::Apple => 0,
            Self::Amazon => 1,
            Self::Google => 2,
            Self::Microsoft => 3,
        }
    }

    /// Wire / display symbol.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apple => "APPLE",
            Self::Amazon => "AMAZON",
            Self::Google => "GOOGLE",
            Self::Microsoft => "MICROSOFT",
        }
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a symbol is outside the tracked set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ticker symbol: {0:?}")]
pub struct UnknownTicker(pub String);

impl FromStr for Ticker {
    type Err = UnknownTicker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTicker(s.to_string()))
    }
}

// ────────────────────────────────────────────
// TickerMap
// ────────────────────────────────────────────

/// Fixed-size map with exactly one slot per ticker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickerMap<T> {
    slots: [T; TICKER_COUNT],
}

impl<T> TickerMap<T> {
    /// Build a map by evaluating `f` for every ticker.
    pub fn from_fn(mut f: impl FnMut(Ticker) -> T) -> Self {
        Self {
            slots: Ticker::ALL.map(&mut f),
        }
    }

    pub fn get(&self, ticker: Ticker) -> &T {
        &self.slots[ticker.index()]
    }

    pub fn get_mut(&mut self, ticker: Ticker) -> &mut T {
        &mut self.slots[ticker.index()]
    }

    pub fn set(&mut self, ticker: Ticker, value: T) {
        self.slots[ticker.index()] = value;
    }

    /// Iterate `(ticker, value)` pairs in feed order.
    pub fn iter(&self) -> impl Iterator<Item = (Ticker, &T)> {
        Ticker::ALL.into_iter().zip(self.slots.iter())
    }
}

impl<T> TickerMap<Option<T>> {
    /// A map with every slot empty.
    pub fn empty() -> Self {
        Self::from_fn(|_| None)
    }

    /// Number of filled slots.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Take every slot if all are filled, leaving the map empty.
    ///
    /// Returns `None` and leaves the map untouched otherwise.
    pub fn take_complete(&mut self) -> Option<TickerMap<T>> {
        match std::mem::replace(&mut self.slots, std::array::from_fn(|_| None)) {
            [Some(a), Some(b), Some(c), Some(d)] => Some(TickerMap { slots: [a, b, c, d] }),
            partial => {
                self.slots = partial;
                None
            }
        }
    }
}

// ────────────────────────────────────────────
// PriceEvent
// ────────────────────────────────────────────

/// A single-ticker price update decoded from the feed.
///
/// The price is always finite and strictly positive; invalid updates
/// cannot be constructed and therefore never reach the coalescer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEvent {
    ticker: Ticker,
    price: f64,
}

impl PriceEvent {
    /// Validate and build an event. `None` for non-finite or non-positive prices.
    pub fn new(ticker: Ticker, price: f64) -> Option<Self> {
        (price.is_finite() && price > 0.0).then_some(Self { ticker, price })
    }

    pub const fn ticker(&self) -> Ticker {
        self.ticker
    }

    pub const fn price(&self) -> f64 {
        self.price
    }
}

// ────────────────────────────────────────────
// PriceSnapshot
// ────────────────────────────────────────────

/// A complete price reading for every tracked ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    prices: TickerMap<f64>,
    completed_at: DateTime<Utc>,
}

impl PriceSnapshot {
    pub fn new(prices: TickerMap<f64>) -> Self {
        Self {
            prices,
            completed_at: Utc::now(),
        }
    }

    pub fn price(&self, ticker: Ticker) -> f64 {
        *self.prices.get(ticker)
    }

    pub const fn prices(&self) -> &TickerMap<f64> {
        &self.prices
    }

    /// Wall-clock time the last missing ticker arrived.
    pub const fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
