//! Statistics generation from the crawl checkpoint
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the checkpoint and the article directory.

use crate::config::Config;
use crate::storage::{count_articles, load_checkpoint};
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// What was found at the checkpoint path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointStatus {
    /// No checkpoint has been written yet
    Missing,
    /// A checkpoint exists but could not be read; the next crawl starts from seeds
    Unreadable(String),
    Loaded,
}

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointStatistics {
    pub status: CheckpointStatus,

    /// Identifiers already processed
    pub visited: usize,

    /// Items waiting in the queue
    pub queued: usize,

    /// Queued items per depth
    pub depth_breakdown: BTreeMap<u32, usize>,

    /// Article files in the data directory
    pub articles: usize,

    /// When the checkpoint was written, if recorded
    pub saved_at: Option<DateTime<Utc>>,
}

/// Loads statistics from the checkpoint and data directory
pub fn load_statistics(config: &Config) -> Result<CheckpointStatistics, CrawlError> {
    let articles = count_articles(&config.output.data_dir)?;

    let empty = |status| CheckpointStatistics {
        status,
        visited: 0,
        queued: 0,
        depth_breakdown: BTreeMap::new(),
        articles,
        saved_at: None,
    };

    let checkpoint = match load_checkpoint(&config.output.checkpoint_path) {
        Ok(Some(checkpoint)) => checkpoint,
        Ok(None) => return Ok(empty(CheckpointStatus::Missing)),
        Err(e) => {
            tracing::warn!("Checkpoint unreadable: {}", e);
            return Ok(empty(CheckpointStatus::Unreadable(e.to_string())));
        }
    };

    let mut depth_breakdown = BTreeMap::new();
    for item in &checkpoint.queue {
        *depth_breakdown.entry(item.depth).or_insert(0) += 1;
    }

    Ok(CheckpointStatistics {
        status: CheckpointStatus::Loaded,
        visited: checkpoint.visited.len(),
        queued: checkpoint.queue.len(),
        depth_breakdown,
        articles,
        saved_at: checkpoint.saved_at,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CheckpointStatistics) {
    println!("=== Crawl Statistics ===\n");

    match &stats.status {
        CheckpointStatus::Loaded => {}
        CheckpointStatus::Missing => {
            println!("No checkpoint found; the crawl has not run yet.");
            println!("  Articles saved: {}", stats.articles);
            return;
        }
        CheckpointStatus::Unreadable(reason) => {
            println!("Checkpoint unreadable: {}", reason);
            println!("The next crawl will start from the seed file.");
            println!("  Articles saved: {}", stats.articles);
            return;
        }
    }

    println!("Overview:");
    println!("  Articles visited: {}", stats.visited);
    println!("  Articles queued: {}", stats.queued);
    println!("  Articles saved: {}", stats.articles);
    match stats.saved_at {
        Some(saved_at) => println!("  Last checkpoint: {}", saved_at.to_rfc3339()),
        None => println!("  Last checkpoint: unknown"),
    }
    println!();

    if !stats.depth_breakdown.is_empty() {
        println!("Queue by Depth:");
        for (depth, count) in &stats.depth_breakdown {
            let percentage = (*count as f64 / stats.queued.max(1) as f64) * 100.0;
            println!("  Depth {}: {} ({:.1}%)", depth, count, percentage);
        }
        println!();
    }

    let hit_rate = if stats.visited > 0 {
        (stats.articles as f64 / stats.visited as f64) * 100.0
    } else {
        0.0
    };
    println!("Relevance rate: {:.1}%", hit_rate);
}
