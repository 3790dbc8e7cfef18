use crate::types::{FetchConfig, MonitorError, Result};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// HTTP client shared by every adapter in a scan.
///
/// Built once by the orchestrator from a [`FetchConfig`] and handed to the
/// adapters by reference. Each request is bounded by the configured timeout
/// and is attempted exactly once.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }

    /// Handle to the configured client. Cloning shares the connection pool.
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// GET `url` and return the body. Any non-2xx status is an error.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!(%url, "Fetching");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success response");
            return Err(MonitorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Fetched"
        );
        Ok(body)
    }
}
