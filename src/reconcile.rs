//! New-event detection
//!
//! [`reconcile`] turns one scrape of the event page into the minimal set of
//! "new since last check" records, ordered for delivery. It is a pure
//! function of its two inputs, with no I/O and no clock, so every edge case
//! is directly testable.
//!
//! The scrape is trusted to be newest-first; list position is the only
//! recency signal the page offers. The marker (`previous`) is the id of the
//! most recently notified or baselined event and acts as the reconciliation
//! boundary: everything in front of it is new.

use std::collections::HashSet;

use crate::models::Event;

/// Result of reconciling one scrape against the persisted marker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// Events to notify, oldest-first so the destination feed reads
    /// chronologically
    pub to_notify: Vec<Event>,

    /// Baseline id to persist instead of notifying; set only on first run
    pub baseline: Option<String>,
}

impl Plan {
    /// True when the cycle has nothing to send and nothing to baseline
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_notify.is_empty() && self.baseline.is_none()
    }
}

/// Compute the notification plan for one scrape.
///
/// * Empty scrape: empty plan. An empty list signals a fetch failure or a
///   markup change upstream; good state is never overwritten with emptiness.
/// * No marker (first run): empty plan, baseline set to the newest item's
///   id. Events that predate deployment are never notified.
/// * Otherwise: scan newest-first, collecting records until the marker is
///   found (the marker itself excluded). If the marker has aged out of the
///   page entirely, the whole scrape becomes the candidate set: bounded
///   staleness is preferred over silent starvation. When the visible window is smaller
///   than the poll gap this can re-send events that were already notified;
///   that duplicate risk is accepted and kept for compatibility with the
///   original bot.
///
/// Records with empty ids are ignored and duplicate ids within one scrape
/// are collapsed to their first (newest) occurrence, so a scraper bug can
/// never produce a duplicated notification inside a single plan.
///
/// The caller persists the marker incrementally as each planned event is
/// delivered, not in one batch; that bounds the duplicate window on crash
/// to a single event.
#[must_use]
pub fn reconcile(events: &[Event], previous: Option<&str>) -> Plan {
    let mut seen = HashSet::new();
    let fresh: Vec<&Event> = events
        .iter()
        .filter(|e| !e.id.is_empty() && seen.insert(e.id.as_str()))
        .collect();

    let Some(newest) = fresh.first() else {
        return Plan::default();
    };

    let Some(marker) = previous else {
        return Plan {
            to_notify: Vec::new(),
            baseline: Some(newest.id.clone()),
        };
    };

    let new_events: Vec<Event> = fresh
        .iter()
        .take_while(|e| e.id != marker)
        .map(|e| (*e).clone())
        .collect();

    Plan {
        to_notify: new_events.into_iter().rev().collect(),
        baseline: None,
    }
}
