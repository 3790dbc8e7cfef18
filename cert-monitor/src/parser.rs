use crate::types::{MonitorError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use feed_rs::parser;
use tracing::debug;

#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedEntry {
    pub title: Option<String>,
    pub url: Option<String>,
    /// RSS `description` / Atom `summary`, still HTML.
    pub summary: Option<String>,
    /// Full content body, used when the entry carries no summary.
    pub content: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl ParsedEntry {
    /// Publication time, falling back to the update time. `None` means no
    /// timestamp on the entry could be parsed.
    pub fn resolved_timestamp(&self) -> Option<DateTime<Utc>> {
        self.published.or(self.updated)
    }

    /// Raw body text: the summary, or the content when there is no summary.
    pub fn body(&self) -> &str {
        self.summary
            .as_deref()
            .or(self.content.as_deref())
            .unwrap_or_default()
    }
}

/// Parse RSS/Atom `content` into entries.
///
/// Entry timestamps go through [`parse_timestamp`], so dates written in
/// loose free-text forms still resolve; ones that cannot be read are left
/// as `None` rather than failing the feed.
pub fn parse_feed(content: &str) -> Result<ParsedFeed> {
    debug!("Parsing feed content ({} bytes)", content.len());

    let feed = parser::Builder::new()
        .timestamp_parser(parse_timestamp)
        .build()
        .parse(content.as_bytes())
        .map_err(|e| MonitorError::Parse(format!("Failed to parse feed: {}", e)))?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| ParsedEntry {
            title: entry.title.map(|t| t.content),
            url: entry.links.first().map(|link| link.href.clone()),
            summary: entry.summary.map(|s| s.content),
            content: entry.content.and_then(|c| c.body),
            published: entry.published,
            updated: entry.updated,
        })
        .collect::<Vec<_>>();

    debug!("Parsed feed with {} entries", entries.len());

    Ok(ParsedFeed {
        title: feed.title.map(|t| t.content),
        entries,
    })
}

type TimestampAttempt = fn(&str) -> Option<DateTime<Utc>>;

/// Tried in order; the first success wins.
const TIMESTAMP_ATTEMPTS: &[TimestampAttempt] = &[
    rfc2822,
    rfc3339,
    offset_formats,
    naive_datetime_formats,
    naive_date_formats,
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%a, %d %b %Y %H:%M:%S",
];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Best-effort timestamp parsing. Structured forms (RFC 2822, RFC 3339) are
/// tried before free-text ones; naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIMESTAMP_ATTEMPTS.iter().find_map(|attempt| attempt(raw))
}

fn rfc2822(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn offset_formats(raw: &str) -> Option<DateTime<Utc>> {
    OFFSET_FORMATS.iter().find_map(|format| {
        DateTime::parse_from_str(raw, format)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

fn naive_datetime_formats(raw: &str) -> Option<DateTime<Utc>> {
    NAIVE_DATETIME_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(raw, format)
            .ok()
            .map(|dt| dt.and_utc())
    })
}

fn naive_date_formats(raw: &str) -> Option<DateTime<Utc>> {
    NAIVE_DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(raw, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn structured_and_free_text_dates() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 4, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("Tue, 04 Mar 2025 10:30:00 +0000"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-04T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-04 10:30:00"), Some(expected));

        let midnight = Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("March 04, 2025"), Some(midnight));
        assert_eq!(parse_timestamp("2025-03-04"), Some(midnight));
    }

    #[test]
    fn garbage_is_unresolved() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("sometime last week"), None);
    }
}
