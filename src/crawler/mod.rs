//! Crawler module for article fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - API fetching with retry logic and quota pacing
//! - HTML parsing and article link extraction
//! - Keyword relevance filtering
//! - Overall crawl coordination
//! - Seed harvesting from search results and category trees

mod category;
mod coordinator;
mod fetcher;
mod harvest;
mod parser;
mod relevance;
mod retry;

pub use category::{
    category_title, harvest_category, CategoryHarvester, CategoryReport, DEFAULT_CATEGORY_DEPTH,
};
pub use coordinator::{
    load_frontier, run_crawl, Coordinator, CrawlReport, CrawlSettings, Shutdown,
};
pub use fetcher::{
    build_http_client, ApiFetcher, ArticleSource, CrawlResult, FetchFailure, FetchOutcome,
};
pub use harvest::{harvest_seeds, HarvestReport, Harvester};
pub use parser::{article_identifier, extract_article, ExtractedPage};
pub use relevance::RelevanceFilter;
pub use retry::RetryPolicy;
