use crate::types::{FetchConfig, MonitorError, Result, DEFAULT_USER_AGENT};
use crate::utils::url::is_valid_source_url;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

pub const DEFAULT_SOURCES_PATH: &str = "config/sources.yaml";
pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.yaml";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;
/// Upper bound for `lookback_days`, ten years.
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

/// One RSS/Atom feed to watch.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One announcement page to watch.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PageSource {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub check_for: Vec<String>,
}

/// Provider name to sources, in the order the providers were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMap<T>(pub Vec<(String, Vec<T>)>);

impl<T> Default for ProviderMap<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> ProviderMap<T> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.0.iter().map(|(p, s)| (p.as_str(), s.as_slice()))
    }

    pub fn source_count(&self) -> usize {
        self.0.iter().map(|(_, s)| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.source_count() == 0
    }
}

impl<T> FromIterator<(String, Vec<T>)> for ProviderMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, Vec<T>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ProviderMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ProviderMapVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for ProviderMapVisitor<T> {
            type Value = ProviderMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping from provider name to a list of sources")
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
                Ok(ProviderMap::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((provider, sources)) = map.next_entry::<String, Option<Vec<T>>>()? {
                    entries.push((provider, sources.unwrap_or_default()));
                }
                Ok(ProviderMap(entries))
            }
        }

        deserializer.deserialize_any(ProviderMapVisitor(PhantomData))
    }
}

/// Contents of `sources.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub rss_feeds: ProviderMap<FeedSource>,
    #[serde(default)]
    pub announcement_pages: ProviderMap<PageSource>,
}

impl SourcesConfig {
    pub fn is_empty(&self) -> bool {
        self.rss_feeds.is_empty() && self.announcement_pages.is_empty()
    }

    /// Every configured URL must be an absolute http(s) URL.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let feed_urls = self.rss_feeds.iter().flat_map(|(p, s)| s.iter().map(move |f| (p, &f.url)));
        let page_urls = self
            .announcement_pages
            .iter()
            .flat_map(|(p, s)| s.iter().map(move |pg| (p, &pg.url)));

        for (provider, url) in feed_urls.chain(page_urls) {
            if !is_valid_source_url(url) {
                return Err(format!("provider '{}' has invalid source URL '{}'", provider, url));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub min_relevance: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_lookback_days() -> i64 {
    DEFAULT_LOOKBACK_DAYS
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub from_email: String,
    #[serde(default)]
    pub to_emails: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub slack: SlackSettings,
}

/// Contents of `settings.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub notification: NotificationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            filters: Filters::default(),
            http: HttpSettings::default(),
            notification: NotificationSettings::default(),
        }
    }
}

impl Settings {
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.http.user_agent.clone(),
            timeout_seconds: self.http.timeout_seconds,
            ..FetchConfig::default()
        }
    }
}

pub fn parse_sources(content: &str, origin: &str) -> Result<SourcesConfig> {
    // An empty document deserializes as unit, which we treat as "no sources".
    if content.trim().is_empty() {
        return Ok(SourcesConfig::default());
    }
    let sources: SourcesConfig =
        serde_yaml::from_str(content).map_err(|e| MonitorError::config(origin, e.to_string()))?;
    sources.validate().map_err(|msg| MonitorError::config(origin, msg))?;
    Ok(sources)
}

pub fn parse_settings(content: &str, origin: &str) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings =
        serde_yaml::from_str(content).map_err(|e| MonitorError::config(origin, e.to_string()))?;
    if settings.lookback_days < 0 {
        return Err(MonitorError::config(origin, "lookback_days must not be negative"));
    }
    if settings.lookback_days > MAX_LOOKBACK_DAYS {
        return Err(MonitorError::config(
            origin,
            format!("lookback_days must be at most {}", MAX_LOOKBACK_DAYS),
        ));
    }
    Ok(settings)
}

pub fn load_sources(path: &Path) -> Result<SourcesConfig> {
    let content = read_config(path)?;
    parse_sources(&content, &path.display().to_string())
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = read_config(path)?;
    parse_settings(&content, &path.display().to_string())
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| MonitorError::config(path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_order_is_preserved() {
        let yaml = r#"
rss_feeds:
  kubernetes:
    - url: https://kubernetes.io/feed.xml
      name: Kubernetes Blog
      keywords: [CKA]
  aws:
    - url: https://aws.amazon.com/blogs/training-and-certification/feed/
      name: AWS T&C
announcement_pages:
  azure:
"#;
        let sources = parse_sources(yaml, "inline").unwrap();
        let providers: Vec<&str> = sources.rss_feeds.iter().map(|(p, _)| p).collect();
        assert_eq!(providers, vec!["kubernetes", "aws"]);
        assert!(sources.rss_feeds.0[1].1[0].keywords.is_empty());
        assert_eq!(sources.announcement_pages.source_count(), 0);
    }

    #[test]
    fn settings_defaults_apply() {
        let settings = parse_settings("filters:\n  min_relevance: 40\n", "inline").unwrap();
        assert_eq!(settings.lookback_days, 7);
        assert_eq!(settings.filters.min_relevance, 40);
        assert_eq!(settings.http.timeout_seconds, 30);
        assert!(!settings.notification.email.enabled);
    }
}
