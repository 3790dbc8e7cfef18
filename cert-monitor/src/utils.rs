/// Text processing utilities
pub mod text {
    /// Cut `text` to at most `max_chars` characters. Counts chars, not bytes,
    /// so multi-byte input never splits a code point.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => text[..byte_idx].to_string(),
            None => text.to_string(),
        }
    }

    /// Like [`truncate_chars`] but appends `...` when something was cut.
    pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
            None => text.to_string(),
        }
    }

    /// Collapse runs of whitespace into single spaces and trim the ends.
    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// HTML to plain text
pub mod html {
    use regex::Regex;
    use std::sync::OnceLock;

    fn tag_regex() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"<[^<]+?>").unwrap())
    }

    /// Convert an HTML fragment to readable plain text.
    ///
    /// With the `rich-text` feature the fragment is parsed into a DOM and its
    /// text nodes are joined; otherwise tags are removed with a regex. Both
    /// paths collapse whitespace.
    pub fn to_text(html: &str) -> String {
        #[cfg(feature = "rich-text")]
        {
            dom_text(html)
        }
        #[cfg(not(feature = "rich-text"))]
        {
            strip_tags(html)
        }
    }

    #[cfg(feature = "rich-text")]
    pub fn dom_text(html: &str) -> String {
        let fragment = scraper::Html::parse_fragment(html);
        let text = fragment
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ");
        super::text::collapse_whitespace(&text)
    }

    /// Regex tag stripper, always available as the fallback path.
    pub fn strip_tags(html: &str) -> String {
        let stripped = tag_regex().replace_all(html, " ");
        let decoded = html_escape::decode_html_entities(&stripped);
        super::text::collapse_whitespace(&decoded)
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    /// Only absolute http(s) URLs are fetchable sources.
    pub fn is_valid_source_url(url_str: &str) -> bool {
        match Url::parse(url_str) {
            Ok(url) => url.scheme() == "http" || url.scheme() == "https",
            Err(_) => false,
        }
    }
}
