pub mod email;
pub mod log;
pub mod slack;

pub use email::EmailNotifier;
pub use log::LogNotifier;
pub use slack::SlackNotifier;

use crate::config::NotificationSettings;
use crate::fetcher::Fetcher;
use crate::types::{Item, Result};
use async_trait::async_trait;
use tracing::{info, warn};

/// A channel the ranked update list can be delivered through.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, items: &[Item]) -> Result<()>;
}

/// Fans a result set out to every enabled channel.
#[derive(Default)]
pub struct NotifierMux {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channels enabled in `settings`. Slack goes after email and posts
    /// through `fetcher`'s client.
    pub fn from_settings(settings: &NotificationSettings, fetcher: &Fetcher) -> Self {
        let mut mux = Self::new();
        if settings.email.enabled {
            mux = mux.with(EmailNotifier::new(settings.email.clone()));
        }
        if settings.slack.enabled {
            mux = mux.with(SlackNotifier::from_settings(&settings.slack, fetcher.client()));
        }
        mux
    }

    /// Only the log channel, for dry runs.
    pub fn log_only() -> Self {
        Self::new().with(LogNotifier)
    }

    pub fn with(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Deliver `items` to every channel. Returns how many channels succeeded.
    ///
    /// Nothing is sent for an empty list. A failing channel is logged and the
    /// rest still run.
    pub async fn notify(&self, items: &[Item]) -> usize {
        if items.is_empty() {
            info!("No updates to notify");
            return 0;
        }
        if self.notifiers.is_empty() {
            info!("No notification channels enabled");
            return 0;
        }

        let mut delivered = 0;
        for notifier in &self.notifiers {
            match notifier.send(items).await {
                Ok(()) => {
                    info!(channel = notifier.name(), count = items.len(), "Notification sent");
                    delivered += 1;
                }
                Err(e) => warn!(channel = notifier.name(), "Notification failed: {}", e),
            }
        }
        delivered
    }
}
