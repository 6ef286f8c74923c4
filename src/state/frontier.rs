//! Crawl frontier: the pending queue plus visited and enqueued indexes
//!
//! The queue is strict FIFO. Discovered links are appended to the tail, so
//! every article at depth `d` is dequeued before any depth `d + 1` article
//! discovered from it, which gives breadth-first order without a priority heap.
//!
//! Two sets guard against duplicate work:
//!
//! - `visited` holds identifiers that were dequeued and processed, whatever
//!   the outcome. Nothing in it is ever fetched or enqueued again.
//! - `enqueued` holds every identifier that was ever admitted to the queue
//!   (and everything visited). [`Frontier::offer`] consults it so an
//!   identifier is enqueued at most once.

use std::collections::{HashSet, VecDeque};

/// Marker for a same-page anchor; identifiers containing it are never fetched
const ANCHOR_MARKER: char = '#';

/// One pending article and its hop count from the seed set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontierItem {
    pub identifier: String,
    pub depth: u32,
}

impl FrontierItem {
    pub fn new(identifier: impl Into<String>, depth: u32) -> Self {
        Self {
            identifier: identifier.into(),
            depth,
        }
    }
}

/// Why a dequeued entry was dropped without being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only identifier
    Malformed,
    /// Already processed
    AlreadyVisited,
    /// Contains a same-page anchor
    Anchor,
}

/// Result of [`Frontier::pop_next`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popped {
    /// Entry should be fetched and processed
    Ready(FrontierItem),
    /// Entry was removed from the queue but must not be processed
    Skipped(FrontierItem, SkipReason),
}

/// Visited set, FIFO queue and enqueued index driving the traversal
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    queue: VecDeque<FrontierItem>,
    visited: HashSet<String>,
    enqueued: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding every distinct seed identifier at depth 0
    ///
    /// Seeds keep their input order; repeats after the first are ignored.
    pub fn from_seeds<I, S>(seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut frontier = Self::new();
        frontier.initialize(seeds);
        frontier
    }

    /// Adds depth-0 items for seeds that are not already known
    pub fn initialize<I, S>(&mut self, seeds: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for seed in seeds {
            self.offer(seed, 0);
        }
    }

    /// Rebuilds a frontier from persisted state
    ///
    /// Queue order is preserved exactly. The enqueued index is reconstructed
    /// as the union of visited identifiers and queued identifiers.
    pub fn restore<V, Q>(visited: V, queue: Q) -> Self
    where
        V: IntoIterator<Item = String>,
        Q: IntoIterator<Item = FrontierItem>,
    {
        let visited: HashSet<String> = visited.into_iter().collect();
        let queue: VecDeque<FrontierItem> = queue.into_iter().collect();

        let mut enqueued = visited.clone();
        enqueued.extend(queue.iter().map(|item| item.identifier.clone()));

        Self {
            queue,
            visited,
            enqueued,
        }
    }

    /// Removes the head of the queue
    ///
    /// Entries that are malformed, already visited, or anchor-bearing come
    /// back as [`Popped::Skipped`] so the caller can move on without fetching.
    pub fn pop_next(&mut self) -> Option<Popped> {
        let item = self.queue.pop_front()?;

        let skip = if item.identifier.trim().is_empty() {
            Some(SkipReason::Malformed)
        } else if self.visited.contains(&item.identifier) {
            Some(SkipReason::AlreadyVisited)
        } else if item.identifier.contains(ANCHOR_MARKER) {
            Some(SkipReason::Anchor)
        } else {
            None
        };

        Some(match skip {
            Some(reason) => Popped::Skipped(item, reason),
            None => Popped::Ready(item),
        })
    }

    /// Records an identifier as processed
    ///
    /// Returns `true` if it was not visited before.
    pub fn mark_visited(&mut self, identifier: &str) -> bool {
        if self.visited.contains(identifier) {
            return false;
        }
        self.enqueued.insert(identifier.to_string());
        self.visited.insert(identifier.to_string())
    }

    /// Appends an identifier to the queue unless it was ever seen before
    ///
    /// Returns `true` if the identifier was enqueued.
    pub fn offer(&mut self, identifier: impl Into<String>, depth: u32) -> bool {
        let identifier = identifier.into();
        if self.visited.contains(&identifier) || self.enqueued.contains(&identifier) {
            return false;
        }
        self.enqueued.insert(identifier.clone());
        self.queue.push_back(FrontierItem { identifier, depth });
        true
    }

    /// Puts a dequeued item back at the head of the queue
    ///
    /// Used when processing an item aborts before it could be marked visited,
    /// so the item survives into the next checkpoint. No-op for visited items.
    pub fn requeue_front(&mut self, item: FrontierItem) {
        if self.visited.contains(&item.identifier) {
            return;
        }
        self.enqueued.insert(item.identifier.clone());
        self.queue.push_front(item);
    }

    pub fn is_visited(&self, identifier: &str) -> bool {
        self.visited.contains(identifier)
    }

    /// True if the identifier is queued or visited
    pub fn is_known(&self, identifier: &str) -> bool {
        self.enqueued.contains(identifier)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending items in dequeue order
    pub fn queued(&self) -> impl Iterator<Item = &FrontierItem> {
        self.queue.iter()
    }

    /// Visited identifiers in lexical order
    pub fn visited_sorted(&self) -> Vec<String> {
        let mut visited: Vec<String> = self.visited.iter().cloned().collect();
        visited.sort();
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(frontier: &mut Frontier) -> FrontierItem {
        match frontier.pop_next() {
            Some(Popped::Ready(item)) => item,
            other => panic!("expected a ready item, got {:?}", other),
        }
    }

    #[test]
    fn test_seeds_enqueued_at_depth_zero_in_order() {
        let mut frontier = Frontier::from_seeds(["A", "B", "A", "C"]);

        assert_eq!(frontier.queue_len(), 3);
        assert_eq!(ready(&mut frontier), FrontierItem::new("A", 0));
        assert_eq!(ready(&mut frontier), FrontierItem::new("B", 0));
        assert_eq!(ready(&mut frontier), FrontierItem::new("C", 0));
        assert!(frontier.pop_next().is_none());
    }

    #[test]
    fn test_offer_enqueues_once() {
        let mut frontier = Frontier::new();

        assert!(frontier.offer("A", 1));
        assert!(!frontier.offer("A", 1));
        assert!(!frontier.offer("A", 2));
        assert_eq!(frontier.queue_len(), 1);
    }

    #[test]
    fn test_offer_after_dequeue_is_rejected() {
        let mut frontier = Frontier::from_seeds(["A"]);
        let item = ready(&mut frontier);

        // Dequeued but not yet visited: still known
        assert!(!frontier.offer(item.identifier.clone(), 1));

        frontier.mark_visited(&item.identifier);
        assert!(!frontier.offer(item.identifier, 1));
        assert!(frontier.is_queue_empty());
    }

    #[test]
    fn test_mark_visited_is_idempotent() {
        let mut frontier = Frontier::new();

        assert!(frontier.mark_visited("A"));
        assert!(!frontier.mark_visited("A"));
        assert_eq!(frontier.visited_count(), 1);
        assert!(frontier.is_known("A"));
    }

    #[test]
    fn test_fifo_preserves_breadth_first_order() {
        let mut frontier = Frontier::from_seeds(["A", "B"]);

        let a = ready(&mut frontier);
        frontier.mark_visited(&a.identifier);
        frontier.offer("A1", a.depth + 1);

        let b = ready(&mut frontier);
        assert_eq!(b.depth, 0);
        frontier.mark_visited(&b.identifier);
        frontier.offer("B1", b.depth + 1);

        assert_eq!(ready(&mut frontier), FrontierItem::new("A1", 1));
        assert_eq!(ready(&mut frontier), FrontierItem::new("B1", 1));
    }

    #[test]
    fn test_restore_rebuilds_enqueued_index() {
        let mut frontier = Frontier::restore(
            vec!["A".to_string()],
            vec![FrontierItem::new("B", 1), FrontierItem::new("C", 1)],
        );

        assert!(frontier.is_visited("A"));
        assert!(frontier.is_known("B"));
        assert!(!frontier.offer("A", 1));
        assert!(!frontier.offer("C", 2));
        assert!(frontier.offer("D", 2));

        assert_eq!(ready(&mut frontier).identifier, "B");
        assert_eq!(ready(&mut frontier).identifier, "C");
        assert_eq!(ready(&mut frontier).identifier, "D");
    }

    #[test]
    fn test_pop_skips_visited_anchor_and_blank_entries() {
        let mut frontier = Frontier::restore(
            vec!["Seen".to_string()],
            vec![
                FrontierItem::new("Seen", 0),
                FrontierItem::new("Page#Section", 1),
                FrontierItem::new("  ", 1),
                FrontierItem::new("Fresh", 1),
            ],
        );

        assert_eq!(
            frontier.pop_next(),
            Some(Popped::Skipped(
                FrontierItem::new("Seen", 0),
                SkipReason::AlreadyVisited
            ))
        );
        assert!(matches!(
            frontier.pop_next(),
            Some(Popped::Skipped(_, SkipReason::Anchor))
        ));
        assert!(matches!(
            frontier.pop_next(),
            Some(Popped::Skipped(_, SkipReason::Malformed))
        ));
        assert_eq!(ready(&mut frontier).identifier, "Fresh");
        assert!(frontier.pop_next().is_none());
    }

    #[test]
    fn test_requeue_front_restores_head() {
        let mut frontier = Frontier::from_seeds(["A", "B"]);
        let a = ready(&mut frontier);

        frontier.requeue_front(a.clone());
        assert_eq!(ready(&mut frontier), a);

        frontier.mark_visited(&a.identifier);
        frontier.requeue_front(a);
        assert_eq!(frontier.queue_len(), 1);
    }

    #[test]
    fn test_visited_sorted() {
        let mut frontier = Frontier::new();
        frontier.mark_visited("Zebra");
        frontier.mark_visited("Apple");

        assert_eq!(frontier.visited_sorted(), vec!["Apple", "Zebra"]);
    }
}
