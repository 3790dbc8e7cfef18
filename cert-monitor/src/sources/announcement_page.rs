use crate::config::PageSource;
use crate::fetcher::Fetcher;
use crate::traits::SourceAdapter;
use crate::types::{Item, ItemKind, MonitorError, Origin, Result, MAX_SUMMARY_CHARS, MAX_TITLE_CHARS};
use crate::utils::text;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info};

/// Sections inspected per search term before giving up on it.
pub const MAX_SECTIONS_PER_TERM: usize = 5;

/// Provider-specific way of reading an announcement page.
///
/// Each provider lays its pages out differently, so matching rules and the
/// confidence given to a hit live here. Supporting a new provider means adding
/// a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    /// AWS certification pages: a hit only counts when it sits inside a
    /// content block, whose text becomes the summary.
    Aws,
    /// Microsoft Learn announcement pages: the heading itself is the hit.
    Azure,
}

/// A single term hit on a page, before origin metadata is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMatch {
    pub term: String,
    pub title: String,
    pub summary: String,
    pub score: u8,
}

impl PageStrategy {
    pub fn for_provider(provider: &str) -> Option<Self> {
        match provider.to_ascii_lowercase().as_str() {
            "aws" => Some(Self::Aws),
            "azure" => Some(Self::Azure),
            _ => None,
        }
    }

    /// Fixed relevance given to every hit from this provider's pages.
    pub fn confidence(self) -> u8 {
        match self {
            Self::Aws => 75,
            Self::Azure => 70,
        }
    }

    fn section_selector(self) -> &'static str {
        match self {
            Self::Aws => "h2, h3, h4, p, div",
            Self::Azure => "h2, h3, h4, div",
        }
    }

    /// Find at most one hit per term in `html`.
    ///
    /// A term is only looked for in sections when the page text mentions it
    /// at all. Up to [`MAX_SECTIONS_PER_TERM`] matching sections are tried
    /// and the first one that yields a hit wins.
    pub fn find_matches(self, html: &str, terms: &[String]) -> Result<Vec<PageMatch>> {
        let document = Html::parse_document(html);
        let selector = Selector::parse(self.section_selector())
            .map_err(|e| MonitorError::Parse(format!("Invalid section selector: {:?}", e)))?;
        let page_text = visible_text(&document).to_lowercase();

        let mut matches = Vec::new();
        for term in terms {
            let term = term.trim();
            if term.is_empty() || !page_text.contains(&term.to_lowercase()) {
                continue;
            }
            let Some(pattern) = term_pattern(term) else {
                continue;
            };

            let hit = document
                .select(&selector)
                .filter(|section| own_string(*section).is_some_and(|s| pattern.is_match(&s)))
                .take(MAX_SECTIONS_PER_TERM)
                .find_map(|section| self.match_section(section, term));

            if let Some(hit) = hit {
                debug!(term, title = %hit.title, "Page term matched");
                matches.push(hit);
            }
        }
        Ok(matches)
    }

    fn match_section(self, section: ElementRef<'_>, term: &str) -> Option<PageMatch> {
        let section_text = element_text(section);
        match self {
            Self::Aws => {
                let container = section
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|el| matches!(el.value().name(), "div" | "section" | "article"))?;
                Some(PageMatch {
                    term: term.to_string(),
                    title: text::truncate_chars(&section_text, MAX_TITLE_CHARS),
                    summary: text::truncate_chars(&element_text(container), MAX_SUMMARY_CHARS),
                    score: self.confidence(),
                })
            }
            Self::Azure => {
                let title = if section_text.is_empty() {
                    format!("Azure: {}", term)
                } else {
                    text::truncate_chars(&section_text, MAX_TITLE_CHARS)
                };
                Some(PageMatch {
                    term: term.to_string(),
                    title,
                    summary: format!("Found mention of '{}' on Microsoft certification page", term),
                    score: self.confidence(),
                })
            }
        }
    }
}

/// Case-insensitive pattern for a term. Terms may be regexes; anything that
/// does not compile is matched literally.
fn term_pattern(term: &str) -> Option<Regex> {
    RegexBuilder::new(term)
        .case_insensitive(true)
        .build()
        .or_else(|_| RegexBuilder::new(&regex::escape(term)).case_insensitive(true).build())
        .ok()
}

/// The text of an element whose only content is a single string, looking
/// through single-child wrappers. Mixed content has no own string.
const NON_RENDERED: [&str; 4] = ["script", "style", "noscript", "template"];

/// Text a reader would see, without script and style bodies.
fn visible_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(t) => Some((node, &**t)),
            _ => None,
        })
        .filter(|(node, _)| {
            !node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| NON_RENDERED.contains(&e.name()))
            })
        })
        .map(|(_, t)| t)
        .collect()
}

fn own_string(element: ElementRef<'_>) -> Option<String> {
    let mut children = element.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match only.value() {
        Node::Text(t) => Some(String::from(&**t)),
        Node::Element(_) => ElementRef::wrap(only).and_then(own_string),
        _ => None,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    text::collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Turns provider announcement pages into fixed-confidence items.
pub struct PageAdapter<'f> {
    fetcher: &'f Fetcher,
}

impl<'f> PageAdapter<'f> {
    pub fn new(fetcher: &'f Fetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl<'f> SourceAdapter for PageAdapter<'f> {
    type Source = PageSource;

    fn kind(&self) -> ItemKind {
        ItemKind::Page
    }

    fn source_name<'a>(&self, source: &'a PageSource) -> &'a str {
        &source.name
    }

    async fn collect(&self, provider: &str, source: &PageSource) -> Result<Vec<Item>> {
        let Some(strategy) = PageStrategy::for_provider(provider) else {
            debug!(provider, page = %source.name, "No page strategy for provider, skipping");
            return Ok(Vec::new());
        };

        let body = self.fetcher.fetch_text(&source.url).await?;
        let origin = Origin::new(provider, &source.name, ItemKind::Page);
        items_from_page(&body, strategy, &origin, source, Utc::now())
    }
}

/// Match `source.check_for` terms in a page body and build items.
pub fn items_from_page(
    html: &str,
    strategy: PageStrategy,
    origin: &Origin,
    source: &PageSource,
    now: DateTime<Utc>,
) -> Result<Vec<Item>> {
    let items: Vec<Item> = strategy
        .find_matches(html, &source.check_for)?
        .into_iter()
        .map(|hit| Item {
            provider: origin.provider.clone(),
            source: origin.source.clone(),
            title: hit.title,
            url: source.url.clone(),
            summary: hit.summary,
            published_date: now,
            relevance_score: hit.score,
            keywords_matched: vec![hit.term],
            kind: origin.kind,
        })
        .collect();

    info!(source = %origin.source, terms = source.check_for.len(), found = items.len(), "Page scanned");
    Ok(items)
}
