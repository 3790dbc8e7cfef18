use super::Notifier;
use crate::digest;
use crate::types::{Item, Result};
use async_trait::async_trait;
use tracing::info;

/// Writes the digest to the log instead of delivering it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, items: &[Item]) -> Result<()> {
        for line in digest::plain_text(items).lines() {
            info!("{}", line);
        }
        Ok(())
    }
}
