//! Error types for the alimi watcher
//!
//! Each collaborator boundary (fetcher, parser, notifier, state store) has
//! its own error enum. The watcher converts all of them to log+continue; no
//! error is allowed to propagate out of a poll cycle.

use thiserror::Error;

/// Errors that can occur while fetching the event page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded")]
    MaxRetriesExceeded,
}

/// Errors that can occur while extracting events from the page
#[derive(Error, Debug)]
pub enum ParseError {
    /// Invalid or unresolvable URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Umbrella error for the fetch+parse pipeline
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors that can occur while delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook responded with a non-success status
    #[error("Webhook returned status {0}")]
    Status(u16),
}

/// Errors that can occur while persisting or loading watcher state
#[derive(Error, Debug)]
pub enum StateError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Check if this error is recoverable (the next poll can retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout | Self::MaxRetriesExceeded => true,
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(FetchError::Timeout.is_recoverable());
        assert!(FetchError::ServerError(503).is_recoverable());
        assert!(!FetchError::ServerError(404).is_recoverable());
    }

    #[test]
    fn test_scrape_error_conversion() {
        let err: ScrapeError = FetchError::Timeout.into();
        assert!(matches!(err, ScrapeError::Fetch(_)));

        let err: ScrapeError = ParseError::InvalidUrl("not a url".to_string()).into();
        assert!(matches!(err, ScrapeError::Parse(_)));
    }
}
