//! HTTP Collaborator Adapters
//!
//! JSON-over-HTTP implementations of the `TradingApi` and
//! `DirectoryApi` ports.
//!
//! Sub-modules:
//! - `client`: Shared reqwest client with timeouts and status mapping
//! - `trading`: Trading aggregator (user information, trades)
//! - `directory`: Employee / department directory
//! - `types`: Wire request/response types

pub mod client;
pub mod directory;
pub mod trading;
pub mod types;

pub use client::{ApiClient, ApiClientConfig};
pub use directory::HttpDirectoryApi;
pub use trading::HttpTradingApi;
