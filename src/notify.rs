//! Outbound notifications
//!
//! Deliveries go to a Discord-compatible webhook as rich embeds. Each send
//! is a single best-effort attempt with a short timeout; a failed delivery
//! is the caller's problem to log, never to retry (the marker advances
//! regardless, so one bad delivery cannot wedge the watcher).
//!
//! Consecutive sends are paced by a rate limiter so a burst of new events
//! does not trip the webhook's rate limits.

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::Client;
use std::time::Duration;

use crate::config::NotifierConfig;
use crate::error::NotifyError;
use crate::models::Event;

/// Embed accent color for new-event notifications
const EVENT_COLOR: u32 = 0x58b9ff;

/// Embed accent color for the startup summary
const SUMMARY_COLOR: u32 = 0x34eb92;

/// Display name the webhook posts under
const WEBHOOK_USERNAME: &str = "FF14 이벤트 알리미";

/// Delivery of event notifications
#[async_trait]
pub trait Notifier {
    /// Deliver one new-event notification
    async fn notify(&self, event: &Event) -> Result<(), NotifyError>;

    /// Deliver a summary of all currently listed events
    async fn notify_summary(&self, events: &[Event]) -> Result<(), NotifyError>;
}

/// Webhook-backed notifier
pub struct DiscordNotifier {
    client: Client,
    url: String,
    pacer: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl DiscordNotifier {
    /// Build a notifier from configuration. Returns `None` when no webhook
    /// URL is configured; callers should fall back to [`NoopNotifier`].
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Http` if the HTTP client cannot be built
    pub fn from_config(config: &NotifierConfig) -> Result<Option<Self>, NotifyError> {
        let Some(url) = &config.webhook_url else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let pacer = (config.pause_secs > 0)
            .then(|| Quota::with_period(Duration::from_secs(config.pause_secs)))
            .flatten()
            .map(RateLimiter::direct);

        Ok(Some(Self {
            client,
            url: url.clone(),
            pacer,
        }))
    }

    /// Build the per-event embed payload
    fn build_event_payload(&self, event: &Event) -> serde_json::Value {
        let mut embed = serde_json::json!({
            "title": format!("🎉 새로운 이벤트 알림: {}", event.title),
            "description": format!("**기간**: {}\n[이벤트 보러가기]({})", event.date, event.link),
            "url": event.link,
            "color": EVENT_COLOR,
            "footer": { "text": "alimi event watcher" },
        });

        if !event.thumbnail.is_empty() {
            embed["image"] = serde_json::json!({ "url": event.thumbnail });
        }

        serde_json::json!({
            "username": WEBHOOK_USERNAME,
            "embeds": [embed],
        })
    }

    /// Build the startup-summary embed payload
    fn build_summary_payload(&self, events: &[Event]) -> serde_json::Value {
        let description = events
            .iter()
            .map(|e| format!("• [{}]({}) ({})", e.title, e.link, e.date))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::json!({
            "username": WEBHOOK_USERNAME,
            "embeds": [{
                "title": "📋 현재 진행 중인 이벤트 목록",
                "description": description,
                "color": SUMMARY_COLOR,
                "footer": { "text": "alimi startup summary" },
            }],
        })
    }

    /// Post a payload once; no retries by design
    async fn post(&self, payload: &serde_json::Value) -> Result<(), NotifyError> {
        if let Some(pacer) = &self.pacer {
            pacer.until_ready().await;
        }

        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        let payload = self.build_event_payload(event);
        self.post(&payload).await?;
        tracing::info!(title = %event.title, "Notification sent");
        Ok(())
    }

    async fn notify_summary(&self, events: &[Event]) -> Result<(), NotifyError> {
        if events.is_empty() {
            return Ok(());
        }

        let payload = self.build_summary_payload(events);
        self.post(&payload).await?;
        tracing::info!(count = events.len(), "Sent active event summary");
        Ok(())
    }
}

#[async_trait]
impl Notifier for Box<dyn Notifier + Send + Sync> {
    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        (**self).notify(event).await
    }

    async fn notify_summary(&self, events: &[Event]) -> Result<(), NotifyError> {
        (**self).notify_summary(events).await
    }
}

#[async_trait]
impl<T: Notifier + Send + Sync> Notifier for std::sync::Arc<T> {
    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        (**self).notify(event).await
    }

    async fn notify_summary(&self, events: &[Event]) -> Result<(), NotifyError> {
        (**self).notify_summary(events).await
    }
}

/// No-op notifier used when no webhook URL is configured
///
/// Every send logs a warning and succeeds, so the watcher still advances its
/// marker and operators can see what would have been delivered.
#[derive(Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        tracing::warn!(title = %event.title, "No webhook URL configured; skipping notification");
        Ok(())
    }

    async fn notify_summary(&self, events: &[Event]) -> Result<(), NotifyError> {
        tracing::warn!(count = events.len(), "No webhook URL configured; skipping summary");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> DiscordNotifier {
        let config = NotifierConfig {
            webhook_url: Some("https://hooks.example.com/wh".to_string()),
            timeout_secs: 5,
            pause_secs: 1,
        };
        DiscordNotifier::from_config(&config).unwrap().unwrap()
    }

    fn event() -> Event {
        Event::new(
            "https://www.ff14.co.kr/news/event/detail/300",
            Some("모그모그 수집제".to_string()),
            Some("2026.08.20 ~ 2026.09.10".to_string()),
            "https://www.ff14.co.kr/news/event/detail/300?category=1",
            Some("https://img.ff14.co.kr/thumb/300.png".to_string()),
        )
    }

    #[test]
    fn test_event_payload_shape() {
        let payload = notifier().build_event_payload(&event());

        assert_eq!(payload["username"], WEBHOOK_USERNAME);
        let embed = &payload["embeds"][0];
        assert_eq!(embed["title"], "🎉 새로운 이벤트 알림: 모그모그 수집제");
        assert_eq!(embed["url"], "https://www.ff14.co.kr/news/event/detail/300?category=1");
        assert_eq!(embed["color"], EVENT_COLOR);
        assert_eq!(embed["image"]["url"], "https://img.ff14.co.kr/thumb/300.png");
        assert!(embed["description"]
            .as_str()
            .unwrap()
            .contains("2026.08.20 ~ 2026.09.10"));
    }

    #[test]
    fn test_event_payload_omits_empty_thumbnail() {
        let mut e = event();
        e.thumbnail = String::new();

        let payload = notifier().build_event_payload(&e);
        assert!(payload["embeds"][0].get("image").is_none());
    }

    #[test]
    fn test_summary_payload_lists_all_events() {
        let mut second = event();
        second.title = "이오르제아 축제".to_string();

        let payload = notifier().build_summary_payload(&[event(), second]);
        let description = payload["embeds"][0]["description"].as_str().unwrap();

        assert!(description.contains("모그모그 수집제"));
        assert!(description.contains("이오르제아 축제"));
        assert_eq!(description.lines().count(), 2);
        assert_eq!(payload["embeds"][0]["color"], SUMMARY_COLOR);
    }

    #[test]
    fn test_from_config_without_url() {
        let config = NotifierConfig {
            webhook_url: None,
            timeout_secs: 5,
            pause_secs: 1,
        };
        assert!(DiscordNotifier::from_config(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_noop_notifier_succeeds() {
        let noop = NoopNotifier;
        assert!(noop.notify(&event()).await.is_ok());
        assert!(noop.notify_summary(&[event()]).await.is_ok());
    }
}
