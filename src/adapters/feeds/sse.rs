//! Server-Sent Events Price Feed Transport
//!
//! Streams `text/event-stream` from the aggregator's price update
//! endpoint. `data:` lines are accumulated until a blank line, then the
//! payload is decoded with the same rules as a WebSocket text frame.

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::header::ACCEPT;
use tracing::{info, instrument};

use super::wire;
use crate::domain::ticker::PriceEvent;
use crate::ports::price_feed::{FeedError, PriceTransport, SessionCloser, TransportSession};

/// Longest line accepted from the event stream.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Incremental `text/event-stream` parser.
///
/// Only the `data` field matters for the price feed; `event`, `id`,
/// `retry` and comment lines are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes of an incomplete line.
    buffer: Vec<u8>,
    /// `data` lines of the event being assembled.
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw body bytes; returns the payloads of every completed event.
    ///
    /// Fails with `FeedError::Decode` once an unterminated line grows past
    /// `MAX_LINE_BYTES`.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, FeedError> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = line
                .split_once(':')
                .map_or((line, ""), |(f, v)| (f, v.strip_prefix(' ').unwrap_or(v)));
            if field == "data" {
                self.data.push(value.to_string());
            }
        }

        if self.buffer.len() > MAX_LINE_BYTES {
            let len = self.buffer.len();
            self.buffer.clear();
            self.data.clear();
            return Err(FeedError::Decode(format!(
                "event-stream line of {len} bytes exceeds {MAX_LINE_BYTES}"
            )));
        }

        Ok(events)
    }
}

/// Price feed over Server-Sent Events.
pub struct SseTransport {
    client: reqwest::Client,
    /// Endpoint, e.g. `http://localhost:8080/stock/updates`.
    url: String,
    /// Deadline for the response headers.
    connect_timeout: Duration,
}

impl SseTransport {
    /// Build the transport. Connect and response headers are time-limited;
    /// the body itself is expected to stay open indefinitely.
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to build SSE HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            connect_timeout,
        })
    }
}

#[async_trait]
impl PriceTransport for SseTransport {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn open(&self) -> Result<Box<dyn TransportSession>, FeedError> {
        let request = self.client.get(&self.url).header(ACCEPT, "text/event-stream").send();
        let response = tokio::time::timeout(self.connect_timeout, request)
            .await
            .map_err(|_| FeedError::Connect(format!("no response headers after {:?}", self.connect_timeout)))?
            .map_err(|e| FeedError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Connect(format!("HTTP {status}")));
        }

        info!("Price feed event stream connected");

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();

        Ok(Box::new(SseSession {
            body,
            decoder: SseDecoder::new(),
            ready: VecDeque::new(),
            closer: SessionCloser::new(),
            finished: false,
        }))
    }
}

/// One open event-stream response body.
struct SseSession {
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    /// Completed payloads not yet decoded.
    ready: VecDeque<String>,
    closer: SessionCloser,
    finished: bool,
}

#[async_trait]
impl TransportSession for SseSession {
    async fn next_event(&mut self) -> Option<Result<PriceEvent, FeedError>> {
        loop {
            if self.closer.is_closed() {
                return None;
            }

            while let Some(payload) = self.ready.pop_front() {
                if let Some(decoded) = wire::decode_frame(&payload) {
                    if decoded.is_err() {
                        self.finished = true;
                        self.ready.clear();
                    }
                    return Some(decoded);
                }
            }

            if self.finished {
                return None;
            }

            let chunk = tokio::select! {
                biased;
                () = self.closer.closed() => return None,
                chunk = self.body.next() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => match self.decoder.feed(&bytes) {
                    Ok(events) => self.ready.extend(events),
                    Err(e) => {
                        self.finished = true;
                        return Some(Err(e));
                    }
                },
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(FeedError::Stream(e.to_string())));
                }
                None => {
                    info!("Price feed event stream ended by peer");
                    self.finished = true;
                    return None;
                }
            }
        }
    }

    fn closer(&self) -> SessionCloser {
        self.closer.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::domain::ticker::Ticker;

    const HEADERS: &[u8] =
        b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n";

    /// Accept one connection, answer with `body` after the headers, keep
    /// the socket open for `hold`, then close it.
    async fn serve_once(body: &'static [u8], hold: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket.write_all(HEADERS).await.unwrap();
            socket.write_all(body).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(hold).await;
        });
        format!("http://{addr}/stock/updates")
    }

    fn transport(url: &str) -> SseTransport {
        SseTransport::new(url, Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_decoder_handles_split_chunks() {
        let mut d = SseDecoder::new();
        assert!(d.feed(b"data:{\"ticker\":\"APP").unwrap().is_empty());
        assert!(d.feed(b"LE\",\"price\":150}\n").unwrap().is_empty());
        let events = d.feed(b"\n").unwrap();
        assert_eq!(events, vec![r#"{"ticker":"APPLE","price":150}"#.to_string()]);
    }

    #[test]
    fn test_decoder_multiple_events_and_crlf() {
        let mut d = SseDecoder::new();
        let events = d.feed(b"data: one\r\n\r\n: keep-alive\n\nevent: price\ndata:two\n\n").unwrap();
        assert_eq!(events, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_decoder_joins_multiline_data() {
        let mut d = SseDecoder::new();
        let events = d.feed(b"data:a\ndata:b\n\n").unwrap();
        assert_eq!(events, vec!["a\nb".to_string()]);
    }

    #[test]
    fn test_blank_line_without_data_emits_nothing() {
        let mut d = SseDecoder::new();
        assert!(d.feed(b"id: 7\n\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_decoder_rejects_unterminated_oversized_line() {
        let mut d = SseDecoder::new();
        assert!(d.feed(&vec![b'x'; MAX_LINE_BYTES]).unwrap().is_empty());
        assert!(matches!(d.feed(b"x"), Err(FeedError::Decode(_))));

        // The decoder starts clean afterwards.
        assert_eq!(d.feed(b"data:ok\n\n").unwrap(), vec!["ok".to_string()]);
    }

    #[tokio::test]
    async fn test_session_decodes_events_until_peer_closes() {
        let url = serve_once(
            b"data: {\"ticker\":\"APPLE\",\"price\":150}\n\n\
              data: {\"ticker\":\"TESLA\",\"price\":1}\n\n\
              : keep-alive\n\n\
              data: {\"ticker\":\"GOOGLE\",\"price\":140.5}\n\n",
            Duration::ZERO,
        )
        .await;
        let mut session = transport(&url).open().await.unwrap();

        let first = session.next_event().await.unwrap().unwrap();
        assert_eq!((first.ticker(), first.price()), (Ticker::Apple, 150.0));
        let second = session.next_event().await.unwrap().unwrap();
        assert_eq!((second.ticker(), second.price()), (Ticker::Google, 140.5));
        assert!(session.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_session_malformed_event_ends_with_decode_error() {
        let url = serve_once(b"data: {oops\n\ndata: {\"ticker\":\"APPLE\",\"price\":1}\n\n", Duration::from_secs(30)).await;
        let mut session = transport(&url).open().await.unwrap();

        assert!(matches!(session.next_event().await, Some(Err(FeedError::Decode(_)))));
        assert!(session.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_close_interrupts_blocked_read() {
        let url = serve_once(b"", Duration::from_secs(30)).await;
        let mut session = transport(&url).open().await.unwrap();

        let closer = session.closer();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            closer.close();
        });

        let started = Instant::now();
        let next = tokio::time::timeout(Duration::from_secs(2), session.next_event()).await;
        assert!(matches!(next, Ok(None)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_silent_server_hits_connect_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let transport = SseTransport::new(format!("http://{addr}/stock/updates"), Duration::from_millis(200)).unwrap();
        let opened = tokio::time::timeout(Duration::from_secs(3), transport.open()).await;
        assert!(matches!(opened, Ok(Err(FeedError::Connect(_)))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connect_error() {
        let transport = SseTransport::new("http://127.0.0.1:9/stock/updates", Duration::from_secs(2)).unwrap();
        assert!(matches!(transport.open().await, Err(FeedError::Connect(_))));
    }
}
