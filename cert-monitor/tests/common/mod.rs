#![allow(dead_code)]

use cert_monitor::{Item, ItemKind};
use chrono::{DateTime, TimeZone, Utc};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Noon UTC on the given day of March 2025.
pub fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
}

pub fn item(provider: &str, title: &str, url: &str, score: u8, published: DateTime<Utc>) -> Item {
    Item {
        provider: provider.to_string(),
        source: format!("{} blog", provider),
        title: title.to_string(),
        url: url.to_string(),
        summary: format!("Summary of {}", title),
        published_date: published,
        relevance_score: score,
        keywords_matched: vec!["exam".to_string()],
        kind: ItemKind::Feed,
    }
}
