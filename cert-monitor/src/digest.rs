use crate::types::Item;
use crate::utils::text;
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::{json, Value};
use std::fmt::Write;

pub const SLACK_MAX_PROVIDERS: usize = 5;
pub const SLACK_MAX_ITEMS_PER_PROVIDER: usize = 3;
pub const SLACK_TITLE_CHARS: usize = 100;
pub const EMAIL_SUMMARY_CHARS: usize = 400;
pub const EMAIL_MAX_KEYWORDS: usize = 5;

/// Items sharing a provider, labelled with the upper-cased provider name.
#[derive(Debug)]
pub struct ProviderGroup<'a> {
    pub provider: String,
    pub items: Vec<&'a Item>,
}

/// Group items by provider. Groups appear in order of first occurrence and
/// keep the ranking inside each group.
pub fn group_by_provider(items: &[Item]) -> Vec<ProviderGroup<'_>> {
    let mut groups: Vec<ProviderGroup<'_>> = Vec::new();
    for item in items {
        let label = if item.provider.is_empty() {
            "OTHER".to_string()
        } else {
            item.provider.to_uppercase()
        };
        match groups.iter_mut().find(|g| g.provider == label) {
            Some(group) => group.items.push(item),
            None => groups.push(ProviderGroup {
                provider: label,
                items: vec![item],
            }),
        }
    }
    groups
}

pub fn email_subject(now: DateTime<Utc>) -> String {
    format!("Certification Updates - {}", now.format("%B %d, %Y"))
}

const EMAIL_STYLE: &str = r#"
body { font-family: -apple-system, 'Segoe UI', Arial, sans-serif; line-height: 1.6; color: #333; max-width: 800px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }
.header { background: #667eea; color: white; padding: 30px; border-radius: 10px; margin-bottom: 30px; text-align: center; }
.summary-box { background-color: #fff3cd; border-left: 4px solid #ffc107; padding: 15px; margin-bottom: 30px; }
.provider-header { background-color: #667eea; color: white; padding: 15px; border-radius: 8px; font-size: 20px; font-weight: bold; margin-bottom: 15px; }
.update-card { background-color: white; border-left: 4px solid #667eea; border-radius: 8px; padding: 20px; margin-bottom: 15px; }
.update-title { font-size: 18px; font-weight: bold; color: #2c3e50; margin-bottom: 10px; }
.update-meta { font-size: 13px; color: #7f8c8d; margin-bottom: 15px; }
.keyword-tag { display: inline-block; background-color: #e8f5e9; color: #2e7d32; padding: 4px 12px; border-radius: 12px; font-size: 12px; margin-right: 8px; }
.btn { display: inline-block; padding: 10px 20px; background-color: #667eea; color: white !important; text-decoration: none; border-radius: 5px; }
"#;

/// HTML email body. Every interpolated value is escaped.
pub fn email_html(items: &[Item], now: DateTime<Utc>) -> String {
    let groups = group_by_provider(items);
    let mut html = String::new();

    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "<html><head><style>{}</style></head><body>\
         <div class=\"header\"><h1>Certification Updates</h1><p>{}</p></div>\
         <div class=\"summary-box\"><strong>Summary:</strong> Found {} updates across {} providers</div>",
        EMAIL_STYLE,
        now.format("%B %d, %Y"),
        items.len(),
        groups.len()
    );

    for group in &groups {
        let _ = write!(
            html,
            "<div class=\"provider-section\"><div class=\"provider-header\">{}</div>",
            encode_text(&group.provider)
        );
        for item in &group.items {
            write_email_card(&mut html, item);
        }
        html.push_str("</div>");
    }

    html.push_str(
        "<div style=\"margin-top: 40px; text-align: center; color: #7f8c8d; font-size: 12px;\">\
         <p>Automated Certification Monitor</p></div></body></html>",
    );
    html
}

fn write_email_card(html: &mut String, item: &Item) {
    let title = if item.title.is_empty() { "No title" } else { item.title.as_str() };
    let _ = write!(
        html,
        "<div class=\"update-card\"><div class=\"update-title\">{}</div>\
         <div class=\"update-meta\">{} | {} | {}/100</div>",
        encode_text(title),
        encode_text(&item.source),
        item.published_date.format("%Y-%m-%d"),
        item.relevance_score
    );

    if !item.keywords_matched.is_empty() {
        html.push_str("<div class=\"keywords\">");
        for keyword in item.keywords_matched.iter().take(EMAIL_MAX_KEYWORDS) {
            let _ = write!(html, "<span class=\"keyword-tag\">{}</span>", encode_text(keyword));
        }
        html.push_str("</div>");
    }

    let summary = email_summary(&item.summary);
    if !summary.is_empty() {
        let _ = write!(html, "<div class=\"update-summary\">{}</div>", encode_text(&summary));
    }

    if !item.url.is_empty() {
        let _ = write!(
            html,
            "<a href=\"{}\" class=\"btn\">Read Full Article</a>",
            encode_double_quoted_attribute(&item.url)
        );
    }
    html.push_str("</div>");
}

/// Single-line summary capped at [`EMAIL_SUMMARY_CHARS`].
pub fn email_summary(summary: &str) -> String {
    let flat = summary.replace(['\r', '\n'], " ");
    text::truncate_with_ellipsis(flat.trim(), EMAIL_SUMMARY_CHARS)
}

/// Slack block-kit payload for an incoming webhook.
pub fn slack_payload(items: &[Item]) -> Value {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("🔔 {} Certification Updates", items.len()),
                "emoji": true
            }
        }),
        json!({ "type": "divider" }),
    ];

    for group in group_by_provider(items).iter().take(SLACK_MAX_PROVIDERS) {
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*{}* - {} update(s)", group.provider, group.items.len())
            }
        }));

        for item in group.items.iter().take(SLACK_MAX_ITEMS_PER_PROVIDER) {
            let title = if item.title.is_empty() { "No title" } else { item.title.as_str() };
            let mut block = json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "*{}*\n_{}_ • Score: {}/100",
                        text::truncate_chars(title, SLACK_TITLE_CHARS),
                        item.source,
                        item.relevance_score
                    )
                }
            });
            if !item.url.is_empty() {
                block["accessory"] = json!({
                    "type": "button",
                    "text": { "type": "plain_text", "text": "Read" },
                    "url": item.url
                });
            }
            blocks.push(block);
        }

        blocks.push(json!({ "type": "divider" }));
    }

    json!({ "blocks": blocks })
}

/// Plain-text digest for logs and terminals.
pub fn plain_text(items: &[Item]) -> String {
    if items.is_empty() {
        return "No new certification updates found.".to_string();
    }

    let mut out = format!("{} certification updates\n", items.len());
    for group in group_by_provider(items) {
        let _ = writeln!(out, "\n{} ({})", group.provider, group.items.len());
        for item in group.items {
            let _ = writeln!(
                out,
                "  [{:>3}] {} ({}, {})",
                item.relevance_score,
                item.title,
                item.source,
                item.published_date.format("%Y-%m-%d")
            );
            if !item.url.is_empty() {
                let _ = writeln!(out, "        {}", item.url);
            }
        }
    }
    out
}
