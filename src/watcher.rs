//! Poll cycle orchestration
//!
//! [`Watcher`] ties the collaborators together: one scrape per tick, the
//! reconciler's plan delivered oldest-first, and the marker persisted
//! immediately after each delivery attempt. Persisting per event is what
//! makes interruption mid-plan safe: on the next cycle the reconciler
//! simply treats already-notified events as no longer new, so the duplicate
//! window on crash is at most one event.
//!
//! Every collaborator failure is converted to log+continue at the boundary
//! where it occurs; nothing propagates out of a cycle. Cycles never overlap
//! because there is only one task.

use rand::Rng;
use std::time::Duration;

use crate::config::WatcherConfig;
use crate::notify::Notifier;
use crate::reconcile::reconcile;
use crate::scrape::EventSource;
use crate::state::StateStore;

/// What one poll cycle did, for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Events present in the scrape
    pub fetched: usize,

    /// Notifications attempted
    pub notified: usize,

    /// Whether this cycle recorded a first-run baseline
    pub baselined: bool,
}

/// Periodic event watcher
pub struct Watcher<S, T, N> {
    source: S,
    store: T,
    notifier: N,
    config: WatcherConfig,
}

impl<S, T, N> Watcher<S, T, N>
where
    S: EventSource,
    T: StateStore,
    N: Notifier,
{
    /// Build a watcher from its collaborators
    pub fn new(config: WatcherConfig, source: S, store: T, notifier: N) -> Self {
        Self {
            source,
            store,
            notifier,
            config,
        }
    }

    /// Run one full poll cycle
    ///
    /// `send_summary` triggers the state-independent broadcast of the whole
    /// current listing; it is set only for the startup cycle when requested
    /// via the CLI.
    ///
    /// # Errors
    ///
    /// Collaborator failures are handled here; an error return is reserved
    /// for genuinely unexpected conditions and makes the scheduling loop
    /// back off before the next cycle.
    pub async fn run_cycle(&self, send_summary: bool) -> anyhow::Result<CycleReport> {
        tracing::info!("Checking for new events...");

        let events = match self.source.fetch_events().await {
            Ok(events) => events,
            Err(e) => {
                // Transient by definition; the next tick retries naturally
                tracing::error!(error = %e, "Failed to fetch events");
                return Ok(CycleReport::default());
            }
        };

        if events.is_empty() {
            tracing::warn!("No events fetched");
            return Ok(CycleReport::default());
        }

        let mut report = CycleReport {
            fetched: events.len(),
            ..CycleReport::default()
        };

        // Startup broadcast: an idempotent "current status" message,
        // independent of the marker and of reconciliation
        if send_summary {
            tracing::info!("Startup mode: sending summary...");
            if let Err(e) = self.notifier.notify_summary(&events).await {
                tracing::error!(error = %e, "Failed to send summary");
            }
        }

        let previous = self.store.load();
        let plan = reconcile(&events, previous.as_deref());

        if let Some(baseline) = &plan.baseline {
            // First run: existing events predate deployment, record only
            tracing::info!(id = %baseline, "No previous event data found; saving baseline");
            if let Err(e) = self.store.save(baseline) {
                tracing::error!(error = %e, "Failed to save baseline");
            }
            report.baselined = true;
            return Ok(report);
        }

        if plan.to_notify.is_empty() {
            tracing::debug!("No new events");
            return Ok(report);
        }

        tracing::info!(count = plan.to_notify.len(), "Found new event(s)");

        for event in &plan.to_notify {
            if let Err(e) = self.notifier.notify(event).await {
                tracing::error!(title = %event.title, error = %e, "Failed to send notification");
            }
            report.notified += 1;

            // Advance the marker even when delivery failed: progress is
            // never re-blocked on a single bad delivery, at the cost of a
            // dropped notification if the webhook stays down
            if let Err(e) = self.store.save(&event.id) {
                tracing::error!(id = %event.id, error = %e, "Failed to save marker");
            }
        }

        Ok(report)
    }

    /// Run the watcher until interrupted
    ///
    /// The first cycle runs immediately (with the summary broadcast when
    /// `summary` is set). With `once`, that single cycle is the whole run.
    /// Otherwise one cycle runs per poll interval; an interrupt signal is
    /// honored between cycles, and an unexpected cycle error pauses the
    /// loop for the configured backoff before resuming.
    pub async fn run(&self, once: bool, summary: bool) -> anyhow::Result<()> {
        self.jitter().await;
        if let Err(e) = self.run_cycle(summary).await {
            tracing::error!(error = %e, "Unexpected error in startup cycle");
        }

        if once {
            tracing::info!("Run-once completed; exiting");
            return Ok(());
        }

        let mut ticker = tokio::time::interval(Duration::from_secs(
            self.config.poll_interval_secs,
        ));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; the startup cycle already ran
        ticker.tick().await;

        tracing::info!(
            interval_secs = self.config.poll_interval_secs,
            "Scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.jitter().await;
                    if let Err(e) = self.run_cycle(false).await {
                        tracing::error!(
                            backoff_secs = self.config.error_backoff_secs,
                            error = %e,
                            "Unexpected error in poll cycle; backing off"
                        );
                        tokio::time::sleep(Duration::from_secs(self.config.error_backoff_secs))
                            .await;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupt received; stopping watcher");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Short random delay before each fetch, to soften the request pattern
    async fn jitter(&self) {
        let millis = rand::thread_rng().gen_range(1000..3000);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}
