use super::Notifier;
use crate::config::SlackSettings;
use crate::digest;
use crate::types::{Item, MonitorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

pub const WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";

/// Posts a block-kit digest to a Slack incoming webhook.
pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: Client,
}

impl SlackNotifier {
    /// `client` is the scan's configured HTTP client, so webhook posts get
    /// the same timeout and user agent as source fetches.
    pub fn new(webhook_url: Option<String>, client: Client) -> Self {
        Self { webhook_url, client }
    }

    /// The `SLACK_WEBHOOK_URL` environment variable wins over the
    /// configured URL.
    pub fn from_settings(settings: &SlackSettings, client: Client) -> Self {
        let from_env = std::env::var(WEBHOOK_ENV).ok().filter(|u| !u.trim().is_empty());
        Self::new(from_env.or_else(|| settings.webhook_url.clone()), client)
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, items: &[Item]) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            return Err(MonitorError::notify(self.name(), "webhook URL not configured"));
        };

        let payload = digest::slack_payload(items);
        debug!(blocks = payload["blocks"].as_array().map_or(0, |b| b.len()), "Posting Slack digest");

        let response = self.client.post(url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Status {
                url: "slack webhook".to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
