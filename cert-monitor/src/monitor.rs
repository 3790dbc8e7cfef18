use crate::aggregator::aggregate;
use crate::config::{Settings, SourcesConfig};
use crate::fetcher::Fetcher;
use crate::notify::NotifierMux;
use crate::sources::{FeedAdapter, PageAdapter};
use crate::traits::SourceAdapter;
use crate::types::{Item, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Outcome of one pass over every configured source.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Deduplicated, filtered and ranked.
    pub items: Vec<Item>,
    pub sources_checked: usize,
    pub sources_failed: usize,
    /// Items collected before aggregation.
    pub raw_items: usize,
    pub started_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Default)]
struct Tally {
    items: Vec<Item>,
    checked: usize,
    failed: usize,
}

/// Runs every configured source in order and aggregates what they find.
pub struct Monitor {
    settings: Settings,
    fetcher: Fetcher,
}

impl Monitor {
    pub fn new(settings: Settings, fetcher: Fetcher) -> Self {
        Self { settings, fetcher }
    }

    /// Build the shared HTTP client from `settings.http`.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let fetcher = Fetcher::new(settings.fetch_config())?;
        Ok(Self::new(settings, fetcher))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Check feeds, then announcement pages, one source at a time.
    ///
    /// A failing source is logged and counted; it never aborts the scan.
    pub async fn scan(&self, sources: &SourcesConfig) -> Result<ScanReport> {
        let started_at = Utc::now();
        let mut tally = Tally::default();

        info!(
            feeds = sources.rss_feeds.source_count(),
            pages = sources.announcement_pages.source_count(),
            "Starting certification update scan"
        );

        let feeds = FeedAdapter::new(&self.fetcher).with_lookback_days(self.settings.lookback_days);
        for (provider, list) in sources.rss_feeds.iter() {
            collect_all(&feeds, provider, list, &mut tally).await;
        }

        let pages = PageAdapter::new(&self.fetcher);
        for (provider, list) in sources.announcement_pages.iter() {
            collect_all(&pages, provider, list, &mut tally).await;
        }

        let raw_items = tally.items.len();
        let items = aggregate(tally.items, self.settings.filters.min_relevance);

        if items.is_empty() {
            info!("Scan complete, no new certification updates found");
        } else {
            info!("Found {} relevant certification updates", items.len());
            for (i, item) in items.iter().enumerate() {
                info!("  {}. [{}] {}", i + 1, item.provider.to_uppercase(), item.title);
            }
        }

        Ok(ScanReport {
            items,
            sources_checked: tally.checked,
            sources_failed: tally.failed,
            raw_items,
            started_at,
        })
    }

    /// Scan, then hand the ranked items to `notifier`.
    pub async fn run(&self, sources: &SourcesConfig, notifier: &NotifierMux) -> Result<ScanReport> {
        let report = self.scan(sources).await?;
        notifier.notify(&report.items).await;
        Ok(report)
    }
}

async fn collect_all<A: SourceAdapter>(adapter: &A, provider: &str, sources: &[A::Source], tally: &mut Tally) {
    for source in sources {
        let name = adapter.source_name(source);
        tally.checked += 1;

        match adapter.collect(provider, source).await {
            Ok(items) => {
                info!(provider, source = name, kind = %adapter.kind(), found = items.len(), "Source checked");
                tally.items.extend(items);
            }
            Err(e) => {
                warn!(provider, source = name, kind = %adapter.kind(), "Source failed: {}", e);
                tally.failed += 1;
            }
        }
    }
}
