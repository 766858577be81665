//! Snapshot Feed - Coalesced View of a Supervised Subscription
//!
//! Runs the pure `SnapshotCoalescer` over a `FeedSubscription`,
//! turning per-ticker prices into complete snapshots while passing
//! status changes through untouched.

use prometheus::IntCounter;
use tracing::debug;

use super::stream_supervisor::{FeedEvent, FeedSubscription};
use crate::domain::coalescer::SnapshotCoalescer;
use crate::domain::status::ConnectionStatus;
use crate::domain::ticker::PriceSnapshot;

/// What the dashboard sees.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEvent {
  Status(ConnectionStatus),
  Snapshot(PriceSnapshot),
}

pub struct SnapshotFeed {
  subscription: FeedSubscription,
  coalescer: SnapshotCoalescer,
  /// Price events folded so far.
  price_events: u64,
  /// Bumped on every price event, including rounds that never complete.
  price_counter: Option<IntCounter>,
}

impl SnapshotFeed {
  pub fn new(subscription: FeedSubscription) -> Self {
    Self {
      subscription,
      coalescer: SnapshotCoalescer::new(),
      price_events: 0,
      price_counter: None,
    }
  }

  #[must_use]
  pub fn with_price_counter(mut self, counter: IntCounter) -> Self {
    self.price_counter = Some(counter);
    self
  }

  /// Next status change or completed snapshot; `None` once stopped.
  pub async fn next(&mut self) -> Option<SnapshotEvent> {
    loop {
      match self.subscription.next().await? {
        FeedEvent::Price(event) => {
          self.price_events += 1;
          if let Some(counter) = &self.price_counter {
            counter.inc();
          }
          if let Some(snapshot) = self.coalescer.push(event) {
            return Some(SnapshotEvent::Snapshot(snapshot));
          }
        }
        FeedEvent::Status(status) => {
          if self.coalescer.pending_len() > 0 && status != ConnectionStatus::Live {
            debug!(
              pending = self.coalescer.pending_len(),
              status = %status,
              "Discarding partial price round"
            );
          }
          self.coalescer.observe_status(status);
          return Some(SnapshotEvent::Status(status));
        }
      }
    }
  }

  pub const fn price_events(&self) -> u64 {
    self.price_events
  }

  pub fn status(&self) -> ConnectionStatus {
    self.subscription.status()
  }

  /// Stop the underlying subscription.
  pub async fn cancel(self) {
    self.subscription.cancel().await;
  }
}
