use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Article-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub provider: ProviderConfig,
    pub output: OutputConfig,
}

/// Traversal and relevance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link hops from a seed article
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of distinct articles to process
    #[serde(rename = "article-limit")]
    pub article_limit: usize,

    /// Sleep between successive articles (milliseconds)
    #[serde(rename = "politeness-delay")]
    pub politeness_delay: u64,

    /// Case-insensitive keywords; an article must mention one to be kept
    pub keywords: Vec<String>,

    /// Log a progress line every N processed articles
    #[serde(rename = "progress-interval", default = "default_progress_interval")]
    pub progress_interval: usize,
}

/// Content provider endpoint and request budget
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// API root, e.g. `https://api.wikimedia.org/core/v1`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Project name in the endpoint path
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Language edition in the endpoint path
    #[serde(default = "default_language")]
    pub language: String,

    /// Request quota per hour; 0 disables the rate-limit delay
    #[serde(rename = "requests-per-hour")]
    pub requests_per_hour: u32,

    /// Attempts per article before giving up
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff interval (milliseconds), doubled after each failure
    #[serde(rename = "backoff-base", default = "default_backoff_base")]
    pub backoff_base: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Bearer token sent as `Authorization`
    #[serde(rename = "access-token", default)]
    pub access_token: Option<String>,

    /// MediaWiki Action API used for category listings
    #[serde(rename = "action-api-url", default)]
    pub action_api_url: Option<String>,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one text file per relevant article
    #[serde(rename = "data-dir")]
    pub data_dir: PathBuf,

    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: PathBuf,

    #[serde(rename = "seed-path")]
    pub seed_path: PathBuf,
}

impl CrawlerConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay)
    }
}

impl ProviderConfig {
    /// Delay before each request that keeps us under the hourly quota
    pub fn rate_limit_delay(&self) -> Duration {
        if self.requests_per_hour == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(3600) / self.requests_per_hour
        }
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Endpoint root for this provider and language, without a trailing slash
    pub fn endpoint_root(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.provider,
            self.language
        )
    }

    /// Action API endpoint; defaults to the language edition's `w/api.php`
    pub fn action_api_url(&self) -> String {
        match self.action_api_url.as_deref() {
            Some(url) => url.to_string(),
            None => format!("https://{}.{}.org/w/api.php", self.language, self.provider),
        }
    }
}

fn default_progress_interval() -> usize {
    10
}

fn default_provider() -> String {
    "wikipedia".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    30
}
