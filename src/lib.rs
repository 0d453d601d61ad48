//! alimi - FFXIV Korea event watcher
//!
//! A single-process polling agent that scrapes the FFXIV Korea event listing
//! page, detects newly published events against a locally persisted marker,
//! and pushes Discord webhook notifications.
//!
//! # Architecture
//!
//! - [`config`] - Configuration from environment variables or a TOML file
//! - [`models`] - The scraped event record
//! - [`scrape`] - Page fetcher and event list parser
//! - [`reconcile`] - New-event detection against the persisted marker
//! - [`state`] - Durable latest-event marker storage
//! - [`notify`] - Discord webhook delivery
//! - [`watcher`] - Poll cycle orchestration and scheduling
//! - [`error`] - Error types per collaborator boundary
//!
//! # Example
//!
//! ```no_run
//! use alimi::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let source = PageScraper::new(&config.source)?;
//!     let store = FileStateStore::new(&config.watcher.state_path);
//!     let notifier = NoopNotifier;
//!
//!     let watcher = Watcher::new(config.watcher, source, store, notifier);
//!     watcher.run(true, false).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod reconcile;
pub mod scrape;
pub mod state;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{FetchError, NotifyError, ParseError, ScrapeError, StateError};
    pub use crate::models::Event;
    pub use crate::notify::{DiscordNotifier, NoopNotifier, Notifier};
    pub use crate::reconcile::{reconcile, Plan};
    pub use crate::scrape::{EventSource, PageScraper};
    pub use crate::state::{FileStateStore, MemoryStateStore, StateStore};
    pub use crate::watcher::{CycleReport, Watcher};
}

// Direct re-exports for convenience
pub use models::Event;
pub use reconcile::{reconcile, Plan};
