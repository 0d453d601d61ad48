//! Event page scraping
//!
//! The watcher only depends on the [`EventSource`] trait: one call per poll
//! cycle that yields the currently listed events, newest first. The concrete
//! [`PageScraper`] combines the HTTP fetcher with the list parser; tests
//! substitute their own sources.

pub mod fetcher;
pub mod parse;

use async_trait::async_trait;

use crate::config::SourceConfig;
use crate::error::ScrapeError;
use crate::models::Event;

pub use fetcher::PageFetcher;
pub use parse::EventListParser;

/// Source of event listings for the watcher
///
/// Implementations must return events in page order, which the site
/// publishes newest-first. That ordering is load-bearing: the reconciler
/// treats list position as recency.
#[async_trait]
pub trait EventSource {
    /// Fetch the currently listed events, possibly empty
    async fn fetch_events(&self) -> Result<Vec<Event>, ScrapeError>;
}

/// Live scraper for the event listing page
pub struct PageScraper {
    fetcher: PageFetcher,
    parser: EventListParser,
    target_url: String,
}

impl PageScraper {
    /// Build a scraper from the source configuration
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::Fetch` if the HTTP client cannot be built
    pub fn new(config: &SourceConfig) -> Result<Self, ScrapeError> {
        let fetcher = PageFetcher::new(
            std::time::Duration::from_secs(config.request_timeout_secs),
            config.max_retries,
        )?;

        Ok(Self {
            fetcher,
            parser: EventListParser::new(),
            target_url: config.target_url.clone(),
        })
    }
}

#[async_trait]
impl EventSource for PageScraper {
    async fn fetch_events(&self) -> Result<Vec<Event>, ScrapeError> {
        let html = self.fetcher.fetch(&self.target_url).await?;

        let events = self.parser.parse(&html, &self.target_url)?;

        if events.is_empty() {
            // Distinct from a network failure: the page loaded but held no
            // recognizable items, which usually means the markup changed
            tracing::warn!("No event items found; the site structure might have changed");
        } else {
            tracing::debug!(count = events.len(), "Parsed event list");
        }

        Ok(events)
    }
}
