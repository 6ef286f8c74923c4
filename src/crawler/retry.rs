//! Paced retries with exponential backoff
//!
//! Shared by every client that talks to the provider, so all of them respect
//! the same hourly quota and backoff schedule.

use crate::config::ProviderConfig;
use crate::crawler::fetcher::FetchFailure;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently a request is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per request, at least 1
    pub max_retries: u32,
    /// Wait after the first failed attempt; doubles after each further failure
    pub backoff_base: Duration,
    /// Wait before every attempt
    pub rate_limit_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            backoff_base: config.backoff_base(),
            rate_limit_delay: config.rate_limit_delay(),
        }
    }

    /// Runs `op` until it succeeds or the attempts are used up
    ///
    /// Every attempt is preceded by the rate-limit delay. After failed attempt
    /// `n` the policy waits `backoff_base * 2^(n-1)` before trying again; there
    /// is no wait after the last attempt.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, FetchFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_retries = self.max_retries.max(1);
        let mut backoff = self.backoff_base;
        let mut last_error = String::new();

        for attempt in 1..=max_retries {
            if !self.rate_limit_delay.is_zero() {
                tokio::time::sleep(self.rate_limit_delay).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        "Request for '{}' failed: {} (attempt {}/{})",
                        label,
                        e,
                        attempt,
                        max_retries
                    );
                    last_error = e.to_string();

                    if attempt < max_retries {
                        tokio::time::sleep(backoff).await;
                        backoff = backoff.saturating_mul(2);
                    }
                }
            }
        }

        tracing::warn!("Giving up on '{}' after {} attempts", label, max_retries);

        Err(FetchFailure {
            attempts: max_retries,
            reason: last_error,
        })
    }
}
