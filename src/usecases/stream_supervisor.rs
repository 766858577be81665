//! Stream Supervisor - Self-Healing Price Feed Subscription
//!
//! Wraps a `PriceTransport` in a restart loop and presents one infinite,
//! ordered sequence of `FeedEvent`s per subscription:
//!
//! ```text
//! Disconnected ─subscribe─▶ Connecting ─first event─▶ Live
//!                               ▲    │                  │
//!                         retry │    └──failure──┐      │ failure
//!                               │                ▼      ▼
//!                               └──── delay ── Reconnecting
//! any state ─cancel─▶ Disconnected
//! ```
//!
//! Failures are never surfaced as errors; they become a `Reconnecting`
//! transition and a delayed reopen. Only the consumer can stop the loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::status_cell::StatusCell;
use crate::domain::backoff::RetryPolicy;
use crate::domain::status::ConnectionStatus;
use crate::domain::ticker::PriceEvent;
use crate::ports::price_feed::{FeedError, PriceTransport, TransportSession};

/// Default buffer between the supervisor task and its consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// One item of the supervised sequence, in emission order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedEvent {
  Price(PriceEvent),
  Status(ConnectionStatus),
}

/// Owns the transport, the retry policy and the connection status.
///
/// Drives at most one subscription at a time so the status cell keeps
/// a single writer.
pub struct StreamSupervisor {
  transport: Arc<dyn PriceTransport>,
  policy: RetryPolicy,
  status: Arc<StatusCell>,
  /// Set while a subscription task is running.
  active: Arc<AtomicBool>,
  channel_capacity: usize,
}

impl StreamSupervisor {
  pub fn new(transport: Arc<dyn PriceTransport>) -> Self {
    Self {
      transport,
      policy: RetryPolicy::default(),
      status: Arc::new(StatusCell::new()),
      active: Arc::new(AtomicBool::new(false)),
      channel_capacity: DEFAULT_CHANNEL_CAPACITY,
    }
  }

  #[must_use]
  pub const fn with_policy(mut self, policy: RetryPolicy) -> Self {
    self.policy = policy;
    self
  }

  #[must_use]
  pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
    self.channel_capacity = capacity.max(1);
    self
  }

  /// Watch the connection status. Readable before any subscription.
  pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
    self.status.subscribe()
  }

  pub fn current_status(&self) -> ConnectionStatus {
    self.status.current()
  }

  /// Start streaming.
  ///
  /// Spawns the supervisor task on the current tokio runtime. Fails with
  /// `FeedError::AlreadySubscribed` while a previous subscription is
  /// still running.
  pub fn subscribe(&self) -> Result<FeedSubscription, FeedError> {
    if self
      .active
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      return Err(FeedError::AlreadySubscribed);
    }

    let (events_tx, events_rx) = mpsc::channel(self.channel_capacity);
    let cancel = CancellationToken::new();

    let task = SupervisorTask {
      transport: Arc::clone(&self.transport),
      policy: self.policy,
      status: Arc::clone(&self.status),
      events: events_tx,
      cancel: cancel.clone(),
    };
    let slot = SubscriptionSlot {
      active: Arc::clone(&self.active),
      status: Arc::clone(&self.status),
    };

    let worker = tokio::spawn(async move {
      let _slot = slot;
      task.run().await;
    });

    Ok(FeedSubscription {
      events: events_rx,
      status: self.status.subscribe(),
      cancel,
      worker: Some(worker),
    })
  }
}

/// Consumer handle for one supervised stream.
///
/// Dropping it cancels the stream; `cancel` additionally waits until the
/// transport is closed and the status reads `Disconnected`.
pub struct FeedSubscription {
  events: mpsc::Receiver<FeedEvent>,
  status: watch::Receiver<ConnectionStatus>,
  cancel: CancellationToken,
  worker: Option<JoinHandle<()>>,
}

impl FeedSubscription {
  /// Next event; `None` once the supervisor has stopped.
  pub async fn next(&mut self) -> Option<FeedEvent> {
    self.events.recv().await
  }

  pub fn status(&self) -> ConnectionStatus {
    *self.status.borrow()
  }

  pub fn status_receiver(&self) -> watch::Receiver<ConnectionStatus> {
    self.status.clone()
  }

  /// Deliberately stop streaming.
  ///
  /// Closes the open session, stops a pending retry timer and publishes
  /// `Disconnected`. Nothing is emitted after this returns.
  pub async fn cancel(mut self) {
    self.cancel.cancel();
    self.events.close();
    if let Some(worker) = self.worker.take() {
      if let Err(e) = worker.await {
        error!(error = %e, "Price feed supervisor task failed");
      }
    }
  }
}

impl Drop for FeedSubscription {
  fn drop(&mut self) {
    self.cancel.cancel();
  }
}

/// Frees the supervisor for the next subscription when the task ends,
/// whether it returned or unwound.
struct SubscriptionSlot {
  active: Arc<AtomicBool>,
  status: Arc<StatusCell>,
}

impl Drop for SubscriptionSlot {
  fn drop(&mut self) {
    self.status.publish(ConnectionStatus::Disconnected);
    self.active.store(false, Ordering::SeqCst);
  }
}

/// State owned by the spawned supervisor loop.
struct SupervisorTask {
  transport: Arc<dyn PriceTransport>,
  policy: RetryPolicy,
  status: Arc<StatusCell>,
  events: mpsc::Sender<FeedEvent>,
  cancel: CancellationToken,
}

impl SupervisorTask {
  #[instrument(skip(self), name = "price_feed_supervisor")]
  async fn run(self) {
    // Consecutive failures since the last live session.
    let mut retry_count: u32 = 0;

    loop {
      if !self.transition(ConnectionStatus::Connecting).await {
        break;
      }

      let failure = self.attempt(&mut retry_count).await;
      if !failure.is_retryable() {
        debug!(reason = %failure, "Price feed session stopped");
        break;
      }

      retry_count = retry_count.saturating_add(1);
      let delay = self.policy.delay_for(retry_count);
      warn!(
        error = %failure,
        retry_count,
        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        "Price feed interrupted, scheduling reconnect"
      );

      if !self.transition(ConnectionStatus::Reconnecting).await {
        break;
      }

      tokio::select! {
        biased;
        () = self.cancel.cancelled() => break,
        () = tokio::time::sleep(delay) => {}
      }
    }

    self.status.publish(ConnectionStatus::Disconnected);
    info!("Price feed supervisor stopped");
  }

  /// Open one session and pump it until it ends; returns why it ended.
  async fn attempt(&self, retry_count: &mut u32) -> FeedError {
    let opened = tokio::select! {
      biased;
      () = self.cancel.cancelled() => return FeedError::Cancelled,
      opened = self.transport.open() => opened,
    };

    let mut session = match opened {
      Ok(session) => session,
      Err(e) => return e,
    };

    let outcome = self.pump(session.as_mut(), retry_count).await;
    session.shutdown().await;
    outcome
  }

  async fn pump(&self, session: &mut dyn TransportSession, retry_count: &mut u32) -> FeedError {
    let mut live = false;

    loop {
      let next = tokio::select! {
        biased;
        () = self.cancel.cancelled() => return FeedError::Cancelled,
        next = session.next_event() => next,
      };

      match next {
        Some(Ok(event)) => {
          if !live {
            live = true;
            *retry_count = 0;
            if !self.transition(ConnectionStatus::Live).await {
              return FeedError::Cancelled;
            }
          }
          if !self.emit(FeedEvent::Price(event)).await {
            return FeedError::Cancelled;
          }
        }
        Some(Err(e)) => return e,
        None if self.cancel.is_cancelled() => return FeedError::Cancelled,
        None => return FeedError::Stream("price stream ended by peer".to_string()),
      }
    }
  }

  /// Publish a status and, if it changed, deliver it in-band.
  ///
  /// Returns `false` when the subscription is cancelled or its consumer
  /// is gone.
  async fn transition(&self, status: ConnectionStatus) -> bool {
    if self.cancel.is_cancelled() {
      return false;
    }
    if !self.status.publish(status) {
      return true;
    }
    self.emit(FeedEvent::Status(status)).await
  }

  async fn emit(&self, event: FeedEvent) -> bool {
    tokio::select! {
      biased;
      () = self.cancel.cancelled() => false,
      sent = self.events.send(event) => sent.is_ok(),
    }
  }
}
