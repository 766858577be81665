//! WebSocket Price Feed Transport
//!
//! Opens one WebSocket per session to the price feed endpoint and
//! decodes JSON text frames into `PriceEvent`s. Ping/pong is answered
//! by tungstenite; binary frames are ignored. Closing the session
//! interrupts a pending read immediately, and `shutdown` sends the
//! close frame even when no read is pending.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, instrument};

use super::wire;
use crate::domain::ticker::PriceEvent;
use crate::ports::price_feed::{FeedError, PriceTransport, SessionCloser, TransportSession};

/// Upper bound on the close handshake when a session is torn down.
const CLOSE_GRACE: Duration = Duration::from_millis(250);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Price feed over WebSocket.
pub struct WebSocketTransport {
    /// Endpoint, e.g. `ws://localhost:8080/stock/updates`.
    url: String,
    /// Handshake deadline.
    connect_timeout: Duration,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
        }
    }
}

#[async_trait]
impl PriceTransport for WebSocketTransport {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn open(&self) -> Result<Box<dyn TransportSession>, FeedError> {
        let (stream, _) = tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str()))
            .await
            .map_err(|_| FeedError::Connect(format!("handshake timed out after {:?}", self.connect_timeout)))?
            .map_err(|e| FeedError::Connect(e.to_string()))?;

        info!("Price feed WebSocket connected");

        Ok(Box::new(WebSocketSession {
            stream,
            closer: SessionCloser::new(),
            finished: false,
        }))
    }
}

/// One live WebSocket connection.
struct WebSocketSession {
    stream: WsStream,
    closer: SessionCloser,
    /// Set once the peer closed or the stream failed.
    finished: bool,
}

impl WebSocketSession {
    /// Best-effort close handshake, bounded by `CLOSE_GRACE`.
    async fn close_handshake(&mut self) {
        self.finished = true;
        if tokio::time::timeout(CLOSE_GRACE, self.stream.close(None)).await.is_err() {
            debug!("WebSocket close handshake timed out");
        }
    }
}

#[async_trait]
impl TransportSession for WebSocketSession {
    async fn next_event(&mut self) -> Option<Result<PriceEvent, FeedError>> {
        loop {
            if self.finished {
                return None;
            }

            let msg = tokio::select! {
                biased;
                () = self.closer.closed() => {
                    self.close_handshake().await;
                    return None;
                }
                msg = self.stream.next() => msg,
            };

            match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Some(decoded) = wire::decode_frame(&text) {
                        self.finished = decoded.is_err();
                        return Some(decoded);
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(frame = ?frame, "Price feed WebSocket closed by peer");
                    self.finished = true;
                    return None;
                }
                Some(Ok(Message::Ping(data))) => {
                    debug!(len = data.len(), "Price feed ping received");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(FeedError::Stream(e.to_string())));
                }
                None => {
                    self.finished = true;
                    return None;
                }
            }
        }
    }

    fn closer(&self) -> SessionCloser {
        self.closer.clone()
    }

    async fn shutdown(&mut self) {
        self.closer.close();
        if !self.finished {
            self.close_handshake().await;
        }
    }
}
