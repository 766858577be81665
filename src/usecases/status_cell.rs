//! Single-writer connection status cell.
//!
//! The supervisor is the only writer; any number of readers hold a
//! `watch::Receiver` and are woken on real changes only.

use tokio::sync::watch;
use tracing::info;

use crate::domain::status::ConnectionStatus;

#[derive(Debug)]
pub struct StatusCell {
  tx: watch::Sender<ConnectionStatus>,
}

impl StatusCell {
  pub fn new() -> Self {
    let (tx, _) = watch::channel(ConnectionStatus::Disconnected);
    Self { tx }
  }

  /// Publish a new status. Returns `true` if it differed from the current one.
  pub fn publish(&self, status: ConnectionStatus) -> bool {
    let changed = self.tx.send_if_modified(|current| {
      if *current == status {
        return false;
      }
      *current = status;
      true
    });
    if changed {
      info!(status = %status, "Price feed status changed");
    }
    changed
  }

  pub fn current(&self) -> ConnectionStatus {
    *self.tx.borrow()
  }

  pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
    self.tx.subscribe()
  }
}

impl Default for StatusCell {
  fn default() -> Self {
    Self::new()
  }
}
