//! HTTP fetcher implementation
//!
//! This module handles all requests to the content provider's page endpoint:
//! - Building the HTTP client with the configured user agent and credentials
//! - Pacing requests to stay inside the hourly quota
//! - Retrying failed requests with exponential backoff
//! - Handing the rendered markup to the content extractor

use crate::config::ProviderConfig;
use crate::crawler::parser::extract_article;
use crate::crawler::retry::RetryPolicy;
use crate::{ConfigError, CrawlError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Text and outbound article links of one fetched article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    pub text: String,
    pub links: Vec<String>,
}

/// Why an article could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// Attempts made before giving up
    pub attempts: u32,
    /// Description of the last error
    pub reason: String,
}

/// Result of fetching one article
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(CrawlResult),
    /// Retries are exhausted; the caller treats the article as a dead end
    Failure(FetchFailure),
}

/// Anything the crawl engine can pull articles from
///
/// Implementations perform their own retries. A `Failure` is final for the
/// identifier; the engine never asks again.
#[allow(async_fn_in_trait)]
pub trait ArticleSource {
    async fn fetch(&self, identifier: &str) -> FetchOutcome;
}

/// Body of the `page/{title}/with_html` endpoint
#[derive(Debug, Deserialize)]
struct PageResponse {
    html: String,
}

/// Builds an HTTP client with proper configuration
///
/// The bearer token, when configured, is attached to every request as a
/// default header.
///
/// # Example
///
/// ```no_run
/// # fn provider() -> article_ripple::config::ProviderConfig { unimplemented!() }
/// use article_ripple::crawler::build_http_client;
///
/// let client = build_http_client(&provider()).unwrap();
/// ```
pub fn build_http_client(config: &ProviderConfig) -> Result<Client, CrawlError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = config.access_token.as_deref() {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ConfigError::Validation("access_token contains invalid header characters".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetch client for the provider's page endpoint
#[derive(Debug, Clone)]
pub struct ApiFetcher {
    client: Client,
    endpoint_root: String,
    retry: RetryPolicy,
}

impl ApiFetcher {
    /// Creates a fetcher from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, CrawlError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a fetcher reusing an existing client
    pub fn with_client(client: Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            endpoint_root: config.endpoint_root(),
            retry: RetryPolicy::from_config(config),
        }
    }

    /// URL of the rendered-page endpoint for `identifier`
    pub fn page_url(&self, identifier: &str) -> String {
        format!(
            "{}/page/{}/with_html",
            self.endpoint_root,
            urlencoding::encode(identifier)
        )
    }

    /// Fetches the rendered markup for `identifier` with retries
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Transport error / timeout | Retry |
    /// | Non-2xx status | Retry |
    /// | Body is not the expected JSON | Retry |
    ///
    /// Pacing and backoff follow [`RetryPolicy::run`].
    pub async fn fetch_html(&self, identifier: &str) -> Result<String, FetchFailure> {
        self.retry
            .run(identifier, || self.request_once(identifier))
            .await
    }

    /// Sends a single request without retrying
    async fn request_once(&self, identifier: &str) -> Result<String, CrawlError> {
        let url = self.page_url(identifier);
        let http_err = |source| CrawlError::Http {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?;

        let page: PageResponse = response.json().await.map_err(http_err)?;
        Ok(page.html)
    }
}

impl ArticleSource for ApiFetcher {
    async fn fetch(&self, identifier: &str) -> FetchOutcome {
        match self.fetch_html(identifier).await {
            Ok(html) => {
                let page = extract_article(&html);
                tracing::debug!(
                    "Fetched '{}': {} chars, {} links",
                    identifier,
                    page.text.len(),
                    page.links.len()
                );
                FetchOutcome::Success(CrawlResult {
                    text: page.text,
                    links: page.links,
                })
            }
            Err(failure) => FetchOutcome::Failure(failure),
        }
    }
}
