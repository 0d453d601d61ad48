//! HTTP fetcher for the event listing page
//!
//! A thin wrapper around `reqwest` with browser-like headers, User-Agent
//! rotation, a bounded timeout, and retry with exponential backoff on
//! transient server errors. Non-retryable statuses fail immediately.

use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client,
};
use std::time::Duration;

use crate::error::FetchError;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// Page fetcher with retry and backoff
pub struct PageFetcher {
    client: Client,
    max_retries: u32,
    base_delay_ms: u64,
}

impl PageFetcher {
    /// Create a fetcher with the given timeout and retry budget
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be built
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;

        Ok(Self {
            client,
            max_retries,
            base_delay_ms: 1000,
        })
    }

    /// Fetch a page body with retry on transient failures
    ///
    /// # Errors
    ///
    /// Returns `FetchError::ServerError` on a non-retryable status,
    /// `FetchError::MaxRetriesExceeded` when the retry budget runs out.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                tracing::debug!(attempt, delay_ms = delay, "Retrying page fetch");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let headers = self.build_headers();

            match self.client.get(url).headers(headers).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response.text().await?);
                    } else if Self::should_retry(status.as_u16()) {
                        last_error = Some(FetchError::ServerError(status.as_u16()));
                    } else {
                        return Err(FetchError::ServerError(status.as_u16()));
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(FetchError::Timeout);
                    } else {
                        last_error = Some(FetchError::Http(e));
                    }
                }
            }
        }

        Err(last_error.unwrap_or(FetchError::MaxRetriesExceeded))
    }

    /// Retry on 429 and transient 5xx, never on other statuses
    fn should_retry(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(self.random_user_agent()));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        headers
    }

    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_retry() {
        assert!(PageFetcher::should_retry(429));
        assert!(PageFetcher::should_retry(500));
        assert!(PageFetcher::should_retry(502));
        assert!(PageFetcher::should_retry(503));
        assert!(PageFetcher::should_retry(504));

        assert!(!PageFetcher::should_retry(400));
        assert!(!PageFetcher::should_retry(403));
        assert!(!PageFetcher::should_retry(404));
        assert!(!PageFetcher::should_retry(200));
    }

    #[test]
    fn test_user_agent_pool() {
        let fetcher = PageFetcher::new(Duration::from_secs(5), 3).unwrap();
        for _ in 0..50 {
            assert!(USER_AGENTS.contains(&fetcher.random_user_agent()));
        }
    }

    #[test]
    fn test_headers_present() {
        let fetcher = PageFetcher::new(Duration::from_secs(5), 3).unwrap();
        let headers = fetcher.build_headers();
        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
    }
}
