use crate::types::{MAX_KEYWORDS_MATCHED, MAX_RELEVANCE};

/// Points for a keyword found verbatim in the text.
pub const EXACT_MATCH_POINTS: u32 = 30;
/// Points for a keyword of which only some word was found.
pub const PARTIAL_MATCH_POINTS: u32 = 10;
/// Points for each signal term present, independent of configured keywords.
pub const SIGNAL_TERM_POINTS: u32 = 20;

/// Words that suggest a certification is changing, whatever the feed is about.
pub const SIGNAL_TERMS: &[&str] = &[
    "retiring",
    "new version",
    "updated",
    "launching",
    "changes",
    "announcement",
];

/// Outcome of scoring one piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Relevance {
    pub score: u8,
    pub matched: Vec<String>,
}

impl Relevance {
    pub fn is_relevant(&self) -> bool {
        self.score > 0
    }
}

/// Score `text` against the configured `keywords`.
///
/// Each keyword contributes at most once: an exact substring hit is checked
/// first, and only if it misses does a hit on any single word of the keyword
/// count as partial. Signal terms add on top. The sum is clamped to
/// `0..=100`, and `matched` keeps the first five keywords that fired, in
/// configuration order.
pub fn score<S: AsRef<str>>(text: &str, keywords: &[S]) -> Relevance {
    let text = text.to_lowercase();
    let mut total: u32 = 0;
    let mut matched = Vec::new();

    for keyword in keywords {
        let keyword = keyword.as_ref();
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            continue;
        }

        let points = if text.contains(&needle) {
            EXACT_MATCH_POINTS
        } else if needle.split_whitespace().any(|word| text.contains(word)) {
            PARTIAL_MATCH_POINTS
        } else {
            0
        };

        if points > 0 {
            total += points;
            matched.push(keyword.to_string());
        }
    }

    total += SIGNAL_TERMS
        .iter()
        .filter(|term| text.contains(*term))
        .count() as u32
        * SIGNAL_TERM_POINTS;

    matched.truncate(MAX_KEYWORDS_MATCHED);

    Relevance {
        score: total.min(MAX_RELEVANCE as u32) as u8,
        matched,
    }
}
