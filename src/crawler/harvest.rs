//! Seed harvester
//!
//! Pages through the provider's search endpoint for one query and appends
//! every new result to the seed file. It never follows links.

use crate::config::Config;
use crate::crawler::fetcher::build_http_client;
use crate::storage::{SeedFile, SeedRecord};
use crate::CrawlError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Results requested per search call
const PAGE_SIZE: usize = 100;

/// Last offset queried
const MAX_OFFSET: usize = 2000;

/// Body of the `search/page` endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pages: Vec<SearchPage>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    id: Value,
    key: String,
}

/// Summary of one harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// Search calls that returned results
    pub pages_fetched: usize,
    /// Results seen across all pages
    pub results_seen: usize,
    /// Records appended to the seed file
    pub added: usize,
    /// Records in the seed file after saving
    pub total: usize,
}

/// Search client that writes into a seed file
pub struct Harvester {
    client: Client,
    search_url: String,
    rate_limit_delay: Duration,
}

impl Harvester {
    pub fn new(config: &Config) -> Result<Self, CrawlError> {
        let client = build_http_client(&config.provider)?;
        Ok(Self {
            client,
            search_url: format!("{}/search/page", config.provider.endpoint_root()),
            rate_limit_delay: config.provider.rate_limit_delay(),
        })
    }

    async fn search(&self, query: &str, offset: usize) -> Result<Vec<SearchPage>, CrawlError> {
        let http_err = |source| CrawlError::Http {
            url: self.search_url.clone(),
            source,
        };

        let response: SearchResponse = self
            .client
            .get(&self.search_url)
            .query(&[
                ("q", query.to_string()),
                ("limit", PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?
            .json()
            .await
            .map_err(http_err)?;

        Ok(response.pages)
    }

    /// Runs the search for `query` and merges results into `seeds`
    ///
    /// Stops at the first empty page, the first failed call, or the last
    /// offset. A failed call ends the harvest without an error.
    pub async fn harvest_into(&self, query: &str, seeds: &mut SeedFile) -> HarvestReport {
        let mut report = HarvestReport {
            pages_fetched: 0,
            results_seen: 0,
            added: 0,
            total: 0,
        };

        for offset in (0..=MAX_OFFSET).step_by(PAGE_SIZE) {
            let pages = match self.search(query, offset).await {
                Ok(pages) => pages,
                Err(e) => {
                    tracing::warn!("Search for {:?} failed at offset {}: {}", query, offset, e);
                    break;
                }
            };

            if pages.is_empty() {
                tracing::info!("No more results for {:?} at offset {}", query, offset);
                break;
            }

            report.pages_fetched += 1;
            report.results_seen += pages.len();

            for page in pages {
                let key = page.key.clone();
                if seeds.insert(SeedRecord {
                    id: page.id,
                    key: page.key,
                }) {
                    tracing::debug!("Added seed {:?}", key);
                    report.added += 1;
                }
            }

            tracing::info!(
                "Offset {}: {} seeds so far ({} new)",
                offset,
                seeds.len(),
                report.added
            );

            if !self.rate_limit_delay.is_zero() {
                tokio::time::sleep(self.rate_limit_delay).await;
            }
        }

        report.total = seeds.len();
        report
    }
}

/// Harvests seeds for `query` into the configured seed file
///
/// The seed file is saved even when the search stops early.
pub async fn harvest_seeds(config: &Config, query: &str) -> Result<HarvestReport, CrawlError> {
    let seed_path = &config.output.seed_path;
    let mut seeds = SeedFile::load(seed_path)?;
    tracing::info!(
        "Harvesting seeds for {:?} into {} ({} existing)",
        query,
        seed_path.display(),
        seeds.len()
    );

    let harvester = Harvester::new(config)?;
    let report = harvester.harvest_into(query, &mut seeds).await;

    seeds.save(seed_path)?;
    tracing::info!("Saved {} seeds to {}", seeds.len(), seed_path.display());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, OutputConfig, ProviderConfig};
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(base_url: &str, dir: &TempDir) -> Config {
        Config {
            crawler: CrawlerConfig {
                max_depth: 1,
                article_limit: 10,
                politeness_delay: 0,
                keywords: vec!["neural".to_string()],
                progress_interval: 10,
            },
            provider: ProviderConfig {
                base_url: base_url.to_string(),
                provider: "wikipedia".to_string(),
                language: "en".to_string(),
                requests_per_hour: 0,
                max_retries: 1,
                backoff_base: 1,
                request_timeout: 5,
                user_agent: "TestCrawler/1.0".to_string(),
                access_token: None,
                action_api_url: None,
            },
            output: OutputConfig {
                data_dir: dir.path().join("data"),
                checkpoint_path: dir.path().join("checkpoint.json"),
                seed_path: dir.path().join("seed.json"),
            },
        }
    }

    fn results(keys: &[&str]) -> serde_json::Value {
        let pages: Vec<_> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| json!({ "id": i, "key": key, "title": key.replace('_', " ") }))
            .collect();
        json!({ "pages": pages })
    }

    #[tokio::test]
    async fn test_harvest_pages_until_empty() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/wikipedia/en/search/page"))
            .and(query_param("q", "Computer Vision"))
            .and(query_param("offset", "0"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results(&["A", "B"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wikipedia/en/search/page"))
            .and(query_param("offset", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results(&["B", "C"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wikipedia/en/search/page"))
            .and(query_param("offset", "200"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results(&[])))
            .expect(1)
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri(), &dir);
        let report = harvest_seeds(&config, "Computer Vision").await.unwrap();

        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.results_seen, 4);
        assert_eq!(report.added, 3);

        let seeds = SeedFile::load(&config.output.seed_path).unwrap();
        assert_eq!(seeds.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_harvest_keeps_existing_seeds() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let config = create_test_config(&server.uri(), &dir);

        std::fs::write(&config.output.seed_path, r#"[{"id": 7, "key": "A"}]"#).unwrap();

        Mock::given(method("GET"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results(&["A", "Z"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("offset", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let report = harvest_seeds(&config, "anything").await.unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.total, 2);

        let seeds = SeedFile::load(&config.output.seed_path).unwrap();
        assert_eq!(seeds.records()[0].id, json!(7));
        assert!(seeds.contains_key("Z"));
    }

    #[tokio::test]
    async fn test_failed_search_still_saves() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results(&["Only"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("offset", "100"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri(), &dir);
        let report = harvest_seeds(&config, "x").await.unwrap();

        assert_eq!(report.pages_fetched, 1);
        let seeds = SeedFile::load(&config.output.seed_path).unwrap();
        assert_eq!(seeds.len(), 1);
    }

    #[tokio::test]
    async fn test_stops_at_max_offset() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results(&["Same"])))
            .expect(21)
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri(), &dir);
        let report = harvest_seeds(&config, "x").await.unwrap();
        assert_eq!(report.pages_fetched, 21);
        assert_eq!(report.added, 1);
    }
}
