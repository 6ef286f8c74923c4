//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - Summarizing a finished crawl run or seed harvest
//! - Recording checkpoint statistics for `--stats`

pub mod stats;

pub use stats::{load_statistics, print_statistics, CheckpointStatistics, CheckpointStatus};

use crate::crawler::{CategoryReport, CrawlReport, HarvestReport};

/// Prints the summary of a finished crawl run
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Summary ===\n");
    println!("Stopped: {}", report.state);
    if let Some(error) = &report.error {
        println!("Error: {}", error);
    }
    println!();

    println!("This run:");
    println!("  Articles processed: {}", report.processed);
    println!("  Articles saved: {}", report.persisted);
    println!("  Not relevant: {}", report.irrelevant);
    println!("  Fetch failures: {}", report.failed);
    println!("  Queue entries skipped: {}", report.skipped);
    println!("  Links enqueued: {}", report.enqueued);
    println!();

    println!("Frontier:");
    println!("  Visited total: {}", report.visited_total);
    println!("  Still queued: {}", report.queued_remaining);
}

/// Prints the summary of a seed harvest
pub fn print_harvest_report(report: &HarvestReport) {
    println!("=== Harvest Summary ===\n");
    println!("  Result pages: {}", report.pages_fetched);
    println!("  Results seen: {}", report.results_seen);
    println!("  New seeds: {}", report.added);
    println!("  Seeds total: {}", report.total);
}

/// Prints the summary of a category harvest
pub fn print_category_report(report: &CategoryReport) {
    println!("=== Category Harvest Summary ===\n");
    println!("  Categories listed: {}", report.categories_listed);
    if report.categories_failed > 0 {
        println!("  Categories skipped: {}", report.categories_failed);
    }
    println!("  Articles seen: {}", report.articles_seen);
    println!("  New seeds: {}", report.added);
    println!("  Seeds total: {}", report.total);
}
