use crate::config::{FeedSource, DEFAULT_LOOKBACK_DAYS};
use crate::fetcher::Fetcher;
use crate::parser::{parse_feed, ParsedEntry};
use crate::relevance;
use crate::traits::SourceAdapter;
use crate::types::{Item, ItemKind, Origin, Result, MAX_SUMMARY_CHARS, MAX_TITLE_CHARS};
use crate::utils::{html, text};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

/// Everything needed to turn parsed feed entries into items, apart from the
/// feed body itself.
#[derive(Debug, Clone)]
pub struct FeedContext<'a> {
    pub origin: Origin,
    pub keywords: &'a [String],
    pub now: DateTime<Utc>,
    pub lookback_days: i64,
}

impl FeedContext<'_> {
    /// Oldest publication time still inside the window. `None` when the
    /// window reaches past the representable range, so nothing is cut.
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        Duration::try_days(self.lookback_days).and_then(|window| self.now.checked_sub_signed(window))
    }
}

/// Turns RSS/Atom feeds into keyword-scored items.
pub struct FeedAdapter<'f> {
    fetcher: &'f Fetcher,
    lookback_days: i64,
}

impl<'f> FeedAdapter<'f> {
    pub fn new(fetcher: &'f Fetcher) -> Self {
        Self {
            fetcher,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_lookback_days(mut self, lookback_days: i64) -> Self {
        self.lookback_days = lookback_days;
        self
    }
}

#[async_trait]
impl<'f> SourceAdapter for FeedAdapter<'f> {
    type Source = FeedSource;

    fn kind(&self) -> ItemKind {
        ItemKind::Feed
    }

    fn source_name<'a>(&self, source: &'a FeedSource) -> &'a str {
        &source.name
    }

    async fn collect(&self, provider: &str, source: &FeedSource) -> Result<Vec<Item>> {
        let content = self.fetcher.fetch_text(&source.url).await?;
        let ctx = FeedContext {
            origin: Origin::new(provider, &source.name, ItemKind::Feed),
            keywords: &source.keywords,
            now: Utc::now(),
            lookback_days: self.lookback_days,
        };
        items_from_feed(&content, &ctx)
    }
}

/// Parse a feed body and keep the recent, relevant entries.
pub fn items_from_feed(content: &str, ctx: &FeedContext<'_>) -> Result<Vec<Item>> {
    let feed = parse_feed(content)?;
    let total = feed.entries.len();

    let items: Vec<Item> = feed
        .entries
        .iter()
        .filter_map(|entry| item_from_entry(entry, ctx))
        .collect();

    info!(
        source = %ctx.origin.source,
        entries = total,
        relevant = items.len(),
        "Feed scanned"
    );
    Ok(items)
}

/// Convert one entry, or `None` if it is too old or scores zero.
///
/// Only a timestamp that actually parsed can push an entry outside the
/// lookback window; undated entries are kept and stamped with `now`.
pub fn item_from_entry(entry: &ParsedEntry, ctx: &FeedContext<'_>) -> Option<Item> {
    let resolved = entry.resolved_timestamp();
    if let (Some(published), Some(cutoff)) = (resolved, ctx.cutoff()) {
        if published < cutoff {
            debug!(title = ?entry.title, %published, "Skipping entry outside lookback window");
            return None;
        }
    }

    let title = entry.title.as_deref().unwrap_or_default();
    let body = entry.body();
    let relevance = relevance::score(&format!("{} {}", title, body), ctx.keywords);
    if !relevance.is_relevant() {
        return None;
    }

    let title = if title.trim().is_empty() { "No title" } else { title.trim() };

    Some(Item {
        provider: ctx.origin.provider.clone(),
        source: ctx.origin.source.clone(),
        title: text::truncate_chars(title, MAX_TITLE_CHARS),
        url: entry.url.clone().unwrap_or_default(),
        summary: clean_summary(body),
        published_date: resolved.unwrap_or(ctx.now),
        relevance_score: relevance.score,
        keywords_matched: relevance.matched,
        kind: ctx.origin.kind,
    })
}

/// HTML-stripped summary, cut to 500 characters plus an ellipsis.
pub fn clean_summary(raw: &str) -> String {
    text::truncate_with_ellipsis(&html::to_text(raw), MAX_SUMMARY_CHARS)
}
