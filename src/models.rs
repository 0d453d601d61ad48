// Core data structures for the alimi watcher

use serde::{Deserialize, Serialize};

/// A single game-event listing scraped from the event page.
///
/// Records are created fresh on every scrape and never mutated. The `id` is
/// the canonical event URL with its query string stripped, so two scrapes of
/// the same logical event always produce the same `id` even when the page
/// decorates links with tracking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Stable unique identifier (canonical URL, query params stripped)
    pub id: String,
    /// Event title, `"No Title"` when the markup lacks one
    pub title: String,
    /// Active-period text, `"Unknown Date"` when missing
    pub date: String,
    /// Absolute link to the event page
    pub link: String,
    /// Absolute thumbnail URL, may be empty
    pub thumbnail: String,
}

impl Event {
    /// Build an event from its parts. Title and date fall back to
    /// placeholders so a partially-parsed item still produces a usable
    /// record; the `id` is the caller's responsibility and must be nonempty.
    pub fn new(
        id: impl Into<String>,
        title: Option<String>,
        date: Option<String>,
        link: impl Into<String>,
        thumbnail: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.unwrap_or_else(|| "No Title".to_string()),
            date: date.unwrap_or_else(|| "Unknown Date".to_string()),
            link: link.into(),
            thumbnail: thumbnail.unwrap_or_default(),
        }
    }
}
