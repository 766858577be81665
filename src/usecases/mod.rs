//! Use Cases Layer - Application Logic
//!
//! Orchestrates domain logic with port interfaces.
//!
//! Use cases:
//! - `StreamSupervisor`: Reconnecting price feed with connection status
//! - `SnapshotFeed`: Coalesces supervised prices into complete snapshots
//! - `PriceBoard`: Dashboard facade (valuation, trades, notices)

pub mod price_board;
pub mod snapshot_feed;
pub mod status_cell;
pub mod stream_supervisor;

pub use price_board::{Notice, NoticeLevel, PriceBoard};
pub use snapshot_feed::{SnapshotEvent, SnapshotFeed};
pub use status_cell::StatusCell;
pub use stream_supervisor::{FeedEvent, FeedSubscription, StreamSupervisor};
