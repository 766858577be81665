//! Price Feed Port - Streaming Transport Interface
//!
//! Defines the contract between the stream supervisor and a concrete
//! network transport (WebSocket, SSE, scripted replay). Transports do
//! all wire decoding; the supervisor only ever sees `PriceEvent`s and
//! `FeedError`s.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::ticker::PriceEvent;

/// Failure taxonomy of the streaming feed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
  /// Endpoint unreachable, handshake rejected, or connect timeout.
  #[error("connect failed: {0}")]
  Connect(String),
  /// The stream broke after it was established.
  #[error("stream failed: {0}")]
  Stream(String),
  /// A message could not be decoded; handled like a stream failure.
  #[error("malformed feed message: {0}")]
  Decode(String),
  /// Deliberate shutdown by the consumer. Never retried.
  #[error("subscription cancelled")]
  Cancelled,
  /// The supervisor is already driving a subscription.
  #[error("supervisor already has an active subscription")]
  AlreadySubscribed,
}

impl FeedError {
  /// Whether the supervisor should reconnect after this error.
  pub const fn is_retryable(&self) -> bool {
    matches!(self, Self::Connect(_) | Self::Stream(_) | Self::Decode(_))
  }
}

/// Cloneable close handle for one transport session.
///
/// Closing is idempotent and may happen from any task while another
/// task is blocked in `TransportSession::next_event`; that call then
/// returns `None` without waiting for the next server message.
#[derive(Debug, Clone, Default)]
pub struct SessionCloser {
  token: CancellationToken,
}

impl SessionCloser {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn close(&self) {
    self.token.cancel();
  }

  pub fn is_closed(&self) -> bool {
    self.token.is_cancelled()
  }

  /// Resolves once `close` has been called.
  pub async fn closed(&self) {
    self.token.cancelled().await;
  }
}

/// Opens streaming sessions to the price feed.
#[async_trait]
pub trait PriceTransport: Send + Sync + 'static {
  /// Establish a new session, ready to iterate.
  ///
  /// Returns `FeedError::Connect` when the endpoint is unreachable or
  /// the handshake fails.
  async fn open(&self) -> Result<Box<dyn TransportSession>, FeedError>;
}

/// One open stream. Consumed once; reopen to restart.
#[async_trait]
pub trait TransportSession: Send {
  /// Next decoded event.
  ///
  /// `None` when the peer completed the stream or the session was
  /// closed; `Some(Err(..))` on a stream or decode failure.
  async fn next_event(&mut self) -> Option<Result<PriceEvent, FeedError>>;

  /// Handle that can close this session from anywhere.
  fn closer(&self) -> SessionCloser;

  /// Close the session and release its resources. Idempotent.
  fn close(&self) {
    self.closer().close();
  }

  /// Close and wait for the transport's own teardown, such as a
  /// protocol-level close handshake. Bounded by the transport.
  async fn shutdown(&mut self) {
    self.close();
  }
}
