//! Domain layer - Core price feed and account models.
//!
//! Pure logic with no I/O: the ticker universe, price events and
//! snapshots, the snapshot coalescer, the reconnect backoff schedule,
//! connection status, and account valuation. Everything here is
//! testable with synthetic inputs.

pub mod account;
pub mod backoff;
pub mod coalescer;
pub mod organization;
pub mod status;
pub mod ticker;

// Re-export core types for convenience
pub use account::{Holding, PriceTable, TradeAction, TradeRequest, TradeResponse, UserInformation};
pub use backoff::RetryPolicy;
pub use coalescer::SnapshotCoalescer;
pub use organization::{Department, Employee};
pub use status::{ConnectionStatus, Severity};
pub use ticker::{PriceEvent, PriceSnapshot, Ticker, TickerMap};
