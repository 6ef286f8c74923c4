/// Crawl engine state definitions
///
/// The engine starts `Running` and moves to exactly one stop state.
use std::fmt;

/// Represents the lifecycle state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// The traversal loop is still processing the frontier
    Running,

    // ===== Terminal States =====
    /// The article limit was reached with items left in the queue
    StoppedBoundReached,

    /// The queue drained before the article limit
    StoppedQueueEmpty,

    /// An interrupt signal or an unexpected error stopped the loop
    StoppedInterrupted,
}

impl CrawlState {
    /// Returns true if the crawl ran to one of its natural bounds
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::StoppedBoundReached | Self::StoppedQueueEmpty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::StoppedBoundReached => "stopped_bound_reached",
            Self::StoppedQueueEmpty => "stopped_queue_empty",
            Self::StoppedInterrupted => "stopped_interrupted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
