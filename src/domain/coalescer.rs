//! Snapshot coalescing.
//!
//! The feed delivers one ticker per message, independently and out of
//! order across instruments. Valuation needs a price for every held
//! instrument, so updates are folded into a pending map and released
//! only as complete rounds.

use super::status::ConnectionStatus;
use super::ticker::{PriceEvent, PriceSnapshot, Ticker, TickerMap};

/// Pure fold from single-ticker events to complete snapshots.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCoalescer {
    pending: TickerMap<Option<f64>>,
}

impl SnapshotCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one price; returns a snapshot when the round completes.
    ///
    /// A repeated ticker overwrites its pending value (last write wins).
    pub fn push(&mut self, event: PriceEvent) -> Option<PriceSnapshot> {
        self.pending.set(event.ticker(), Some(event.price()));
        self.pending.take_complete().map(PriceSnapshot::new)
    }

    /// React to a connection status change from the supervisor.
    ///
    /// Anything other than `Live` means the upstream session ended or a
    /// new one is starting; prices from before the outage are dropped.
    pub fn observe_status(&mut self, status: ConnectionStatus) {
        if status != ConnectionStatus::Live {
            self.reset();
        }
    }

    /// Discard any partially collected round.
    pub fn reset(&mut self) {
        self.pending = TickerMap::empty();
    }

    /// Pending price for a ticker in the current round.
    pub fn pending(&self, ticker: Ticker) -> Option<f64> {
        *self.pending.get(ticker)
    }

    /// Number of tickers collected in the current round.
    pub fn pending_len(&self) -> usize {
        self.pending.filled()
    }
}
