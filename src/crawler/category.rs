//! Category seed harvester
//!
//! Lists the members of a category through the MediaWiki Action API,
//! descends into subcategories up to a fixed depth, and appends every
//! main-namespace article to the seed file. Article bodies are never fetched.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, FetchFailure};
use crate::crawler::retry::RetryPolicy;
use crate::storage::{SeedFile, SeedRecord};
use crate::CrawlError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Subcategory levels followed below the starting category
pub const DEFAULT_CATEGORY_DEPTH: u32 = 2;

const CATEGORY_PREFIX: &str = "Category:";

const NS_MAIN: i64 = 0;
const NS_CATEGORY: i64 = 14;

/// Members requested per listing call (the API maximum for ordinary clients)
const MEMBERS_PER_CALL: usize = 500;

/// Body of an `action=query&list=categorymembers` call
#[derive(Debug, Deserialize)]
struct MembersResponse {
    #[serde(default)]
    query: Option<MembersQuery>,
    /// Parameters to send back for the next batch; absent on the last one
    #[serde(default, rename = "continue")]
    continuation: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct MembersQuery {
    #[serde(default)]
    categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryMember {
    #[serde(default)]
    pageid: Value,
    ns: i64,
    title: String,
}

/// Summary of one category harvest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    /// Categories whose member list was read
    pub categories_listed: usize,
    /// Categories skipped because listing them failed
    pub categories_failed: usize,
    /// Main-namespace members seen across all categories
    pub articles_seen: usize,
    /// Records appended to the seed file
    pub added: usize,
    /// Records in the seed file after saving
    pub total: usize,
}

/// Adds the `Category:` prefix when missing and uses spaces for underscores
pub fn category_title(name: &str) -> String {
    let name = name.trim().replace('_', " ");
    if name.starts_with(CATEGORY_PREFIX) {
        name
    } else {
        format!("{}{}", CATEGORY_PREFIX, name)
    }
}

/// Action API client that walks a category tree into a seed file
pub struct CategoryHarvester {
    client: Client,
    api_url: String,
    retry: RetryPolicy,
    max_depth: u32,
}

impl CategoryHarvester {
    pub fn new(config: &Config, max_depth: u32) -> Result<Self, CrawlError> {
        let client = build_http_client(&config.provider)?;
        Ok(Self {
            client,
            api_url: config.provider.action_api_url(),
            retry: RetryPolicy::from_config(&config.provider),
            max_depth,
        })
    }

    async fn list_batch(
        &self,
        category: &str,
        continuation: &BTreeMap<String, String>,
    ) -> Result<MembersResponse, CrawlError> {
        let http_err = |source| CrawlError::Http {
            url: self.api_url.clone(),
            source,
        };

        let limit = MEMBERS_PER_CALL.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("action", "query"),
            ("list", "categorymembers"),
            ("cmtitle", category),
            ("cmprop", "ids|title"),
            ("cmlimit", limit.as_str()),
            ("format", "json"),
            ("formatversion", "2"),
        ];
        params.extend(continuation.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        self.client
            .get(&self.api_url)
            .query(&params)
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?
            .json()
            .await
            .map_err(http_err)
    }

    /// Reads every member of `category`, following continuations
    async fn members(&self, category: &str) -> Result<Vec<CategoryMember>, FetchFailure> {
        let mut members = Vec::new();
        let mut continuation = BTreeMap::new();

        loop {
            let batch = self
                .retry
                .run(category, || self.list_batch(category, &continuation))
                .await?;

            if let Some(query) = batch.query {
                members.extend(query.categorymembers);
            }

            match batch.continuation {
                Some(next) if !next.is_empty() => continuation = next,
                _ => return Ok(members),
            }
        }
    }

    /// Walks the tree below `category` and merges its articles into `seeds`
    ///
    /// Categories are visited breadth-first and each one is listed at most
    /// once. Subcategories are followed while their level is below the
    /// configured depth. A category that cannot be listed is skipped.
    pub async fn harvest_into(&self, category: &str, seeds: &mut SeedFile) -> CategoryReport {
        let mut report = CategoryReport {
            categories_listed: 0,
            categories_failed: 0,
            articles_seen: 0,
            added: 0,
            total: 0,
        };

        let root = category_title(category);
        let mut seen: HashSet<String> = HashSet::from([root.clone()]);
        let mut pending = VecDeque::from([(root, 0u32)]);

        while let Some((category, level)) = pending.pop_front() {
            tracing::info!("Listing {:?} at level {}", category, level);

            let members = match self.members(&category).await {
                Ok(members) => members,
                Err(failure) => {
                    tracing::warn!("Skipping {:?}: {}", category, failure.reason);
                    report.categories_failed += 1;
                    continue;
                }
            };
            report.categories_listed += 1;

            for member in members {
                match member.ns {
                    NS_MAIN => {
                        report.articles_seen += 1;
                        let key = member.title.replace(' ', "_");
                        if seeds.insert(SeedRecord {
                            id: member.pageid,
                            key: key.clone(),
                        }) {
                            tracing::debug!("Added seed {:?}", key);
                            report.added += 1;
                        }
                    }
                    NS_CATEGORY if level < self.max_depth => {
                        let title = category_title(&member.title);
                        if seen.insert(title.clone()) {
                            pending.push_back((title, level + 1));
                        }
                    }
                    _ => tracing::trace!("Ignoring {:?} (namespace {})", member.title, member.ns),
                }
            }
        }

        report.total = seeds.len();
        report
    }
}

/// Harvests the articles of `category` into the configured seed file
///
/// The seed file is saved even when some categories could not be listed.
pub async fn harvest_category(
    config: &Config,
    category: &str,
    max_depth: u32,
) -> Result<CategoryReport, CrawlError> {
    let seed_path = &config.output.seed_path;
    let mut seeds = SeedFile::load(seed_path)?;
    tracing::info!(
        "Harvesting {:?} (depth {}) into {} ({} existing)",
        category,
        max_depth,
        seed_path.display(),
        seeds.len()
    );

    let harvester = CategoryHarvester::new(config, max_depth)?;
    let report = harvester.harvest_into(category, &mut seeds).await;

    seeds.save(seed_path)?;
    tracing::info!("Saved {} seeds to {}", seeds.len(), seed_path.display());

    Ok(report)
}
