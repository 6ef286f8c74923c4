//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Frontier`: the pending queue with per-item depth plus the visited and
//!   enqueued indexes that keep each article to a single fetch
//! - `CrawlState`: the engine's running/stopped lifecycle

mod crawl_state;
mod frontier;

// Re-export main types
pub use crawl_state::CrawlState;
pub use frontier::{Frontier, FrontierItem, Popped, SkipReason};
