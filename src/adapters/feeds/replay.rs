//! Scripted Replay Transport
//!
//! Plays back pre-recorded sessions instead of talking to a server.
//! Each `open()` consumes the next script: either a refusal or a list of
//! steps (frames, pauses, failures, peer completion). A session whose
//! steps run out stays open and quiet until it is closed.
//!
//! Used by integration tests, benchmarks and offline demos.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::wire;
use crate::domain::ticker::{PriceEvent, Ticker};
use crate::ports::price_feed::{FeedError, PriceTransport, SessionCloser, TransportSession};

/// One step of a replayed session.
#[derive(Debug, Clone)]
pub enum ReplayStep {
    /// An already-validated event.
    Event(PriceEvent),
    /// A raw wire message, decoded with the live transport rules.
    Frame(String),
    /// Wait before the next step.
    Pause(Duration),
    /// Break the stream with this error.
    Fail(FeedError),
    /// Peer completes the stream.
    End,
}

impl ReplayStep {
    /// Wire frame for a price update; the price is not validated here.
    pub fn frame(ticker: Ticker, price: f64) -> Self {
        Self::Frame(serde_json::json!({ "ticker": ticker.as_str(), "price": price }).to_string())
    }
}

/// What the next `open()` does.
#[derive(Debug, Clone)]
pub enum ReplayScript {
    Refuse(FeedError),
    Session(Vec<ReplayStep>),
}

/// Transport that replays scripted sessions in order.
#[derive(Debug, Default)]
pub struct ReplayTransport {
    scripts: Mutex<VecDeque<ReplayScript>>,
    /// Total `open()` calls, refused or not.
    opens: AtomicUsize,
    /// Sessions handed out and not yet dropped.
    open_sessions: Arc<AtomicUsize>,
}

impl ReplayTransport {
    pub fn new(scripts: impl IntoIterator<Item = ReplayScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Queue another script after the existing ones.
    pub fn push(&self, script: ReplayScript) {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner).push_back(script);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of sessions currently alive.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceTransport for ReplayTransport {
    async fn open(&self) -> Result<Box<dyn TransportSession>, FeedError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap_or_else(PoisonError::into_inner).pop_front();

        match script {
            None => Err(FeedError::Connect("replay scripts exhausted".to_string())),
            Some(ReplayScript::Refuse(e)) => Err(e),
            Some(ReplayScript::Session(steps)) => {
                self.open_sessions.fetch_add(1, Ordering::SeqCst);
                debug!(steps = steps.len(), "Replay session opened");
                Ok(Box::new(ReplaySession {
                    steps: steps.into(),
                    closer: SessionCloser::new(),
                    ended: false,
                    open_sessions: Arc::clone(&self.open_sessions),
                }))
            }
        }
    }
}

struct ReplaySession {
    steps: VecDeque<ReplayStep>,
    closer: SessionCloser,
    ended: bool,
    open_sessions: Arc<AtomicUsize>,
}

impl Drop for ReplaySession {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TransportSession for ReplaySession {
    async fn next_event(&mut self) -> Option<Result<PriceEvent, FeedError>> {
        loop {
            if self.ended || self.closer.is_closed() {
                return None;
            }

            let Some(step) = self.steps.pop_front() else {
                self.closer.closed().await;
                return None;
            };

            match step {
                ReplayStep::Event(event) => return Some(Ok(event)),
                ReplayStep::Frame(text) => {
                    if let Some(decoded) = wire::decode_frame(&text) {
                        self.ended = decoded.is_err();
                        return Some(decoded);
                    }
                }
                ReplayStep::Pause(delay) => {
                    tokio::select! {
                        biased;
                        () = self.closer.closed() => return None,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                ReplayStep::Fail(e) => {
                    self.ended = true;
                    return Some(Err(e));
                }
                ReplayStep::End => {
                    self.ended = true;
                    return None;
                }
            }
        }
    }

    fn closer(&self) -> SessionCloser {
        self.closer.clone()
    }
}
