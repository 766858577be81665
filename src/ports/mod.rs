//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use cases require from the
//! outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `PriceTransport`: Streaming price feed sessions
//! - `TradingApi`: Account lookup and trade submission
//! - `DirectoryApi`: Employee / department records

pub mod directory;
pub mod price_feed;
pub mod trading_api;

pub use directory::DirectoryApi;
pub use price_feed::{FeedError, PriceTransport, SessionCloser, TransportSession};
pub use trading_api::TradingApi;
