//! Event list extraction from the event page HTML
//!
//! The page lists events as `<li>` items inside a `.banner_list.event`
//! container, each carrying an anchor to the event detail page, a `.txt`
//! title, a `.date` active-period label, and a thumbnail image. Only the
//! anchor is critical: items without a resolvable link are skipped, while
//! missing title/date/thumbnail degrade to placeholders.

use scraper::{Html, Selector};
use url::Url;

use crate::error::ParseError;
use crate::models::Event;

/// Parser for the event listing page
pub struct EventListParser {
    items: Selector,
    anchor: Selector,
    title: Selector,
    date: Selector,
    image: Selector,
}

impl EventListParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Selector::parse(".banner_list.event li").expect("invalid item selector"),
            anchor: Selector::parse("a").expect("invalid anchor selector"),
            title: Selector::parse(".txt").expect("invalid title selector"),
            date: Selector::parse(".date").expect("invalid date selector"),
            image: Selector::parse("img").expect("invalid image selector"),
        }
    }

    /// Extract events from a page, in document (newest-first) order.
    ///
    /// `page_url` is the URL the document was fetched from; relative and
    /// protocol-relative links are resolved against it.
    ///
    /// An empty result means the expected list structure was absent or every
    /// item failed to parse; the caller treats that as a structural
    /// mismatch, not a hard error.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidUrl` only when `page_url` itself cannot
    /// be parsed as a base URL.
    pub fn parse(&self, html: &str, page_url: &str) -> Result<Vec<Event>, ParseError> {
        let base = Url::parse(page_url).map_err(|_| ParseError::InvalidUrl(page_url.to_string()))?;

        let document = Html::parse_document(html);
        let mut events = Vec::new();

        for item in document.select(&self.items) {
            let Some(anchor) = item.select(&self.anchor).next() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            let Ok(link) = base.join(href) else {
                tracing::debug!(href, "Skipping item with unresolvable link");
                continue;
            };

            // Query params vary per visit; strip them for a stable id
            let mut id_url = link.clone();
            id_url.set_query(None);
            id_url.set_fragment(None);

            let title = item
                .select(&self.title)
                .next()
                .map(|el| collect_text(&el));

            let date = item.select(&self.date).next().map(|el| collect_text(&el));

            let thumbnail = item
                .select(&self.image)
                .next()
                .and_then(|img| img.value().attr("src"))
                .and_then(|src| base.join(src).ok())
                .map(|u| u.to_string());

            events.push(Event::new(
                id_url.to_string(),
                title.filter(|t| !t.is_empty()),
                date.filter(|d| !d.is_empty()),
                link.to_string(),
                thumbnail,
            ));
        }

        Ok(events)
    }
}

impl Default for EventListParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse an element's text nodes into one trimmed string
fn collect_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
