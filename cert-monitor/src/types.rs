use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on `Item::keywords_matched`.
pub const MAX_KEYWORDS_MATCHED: usize = 5;
/// Display bound for `Item::title`.
pub const MAX_TITLE_CHARS: usize = 200;
/// Bound for `Item::summary` before the ellipsis marker.
pub const MAX_SUMMARY_CHARS: usize = 500;
/// Upper bound of the relevance scale.
pub const MAX_RELEVANCE: u8 = 100;

/// Where an item was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "rss")]
    Feed,
    #[serde(rename = "webpage")]
    Page,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Feed => write!(f, "rss"),
            ItemKind::Page => write!(f, "webpage"),
        }
    }
}

/// One discovered certification update, normalized from any source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub provider: String,
    pub source: String,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub published_date: DateTime<Utc>,
    pub relevance_score: u8,
    pub keywords_matched: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

impl Item {
    /// Identity used for deduplication: two items with the same url and title
    /// describe the same update.
    pub fn dedup_key(&self) -> (&str, &str) {
        (self.url.as_str(), self.title.as_str())
    }
}

/// Origin metadata stamped onto every item an adapter produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub provider: String,
    pub source: String,
    pub kind: ItemKind,
}

impl Origin {
    pub fn new(provider: impl Into<String>, source: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            provider: provider.into(),
            source: source.into(),
            kind,
        }
    }
}

/// Settings for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_redirects: usize,
}

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Configuration error in {path}: {message}")]
    Config { path: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Notification error ({channel}): {message}")]
    Notify { channel: String, message: String },
}

impl MonitorError {
    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn notify(channel: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Notify {
            channel: channel.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
