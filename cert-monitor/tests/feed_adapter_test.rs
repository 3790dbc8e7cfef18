mod common;

use cert_monitor::parser::ParsedEntry;
use cert_monitor::sources::rss_feed::{clean_summary, item_from_entry, items_from_feed, FeedContext};
use cert_monitor::{ItemKind, Origin, Result};
use chrono::{Duration, TimeZone, Utc};
use common::{init_tracing, march};
use tracing::info;

const AWS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>AWS Training and Certification Blog</title>
    <link>https://aws.amazon.com/blogs/training-and-certification/</link>
    <description>Certification news</description>
    <item>
      <title>AWS Certified Solutions Architect exam retiring</title>
      <link>https://example.com/retiring</link>
      <description><![CDATA[<p>The <b>exam</b> is retiring soon.</p>]]></description>
      <pubDate>Mon, 17 Mar 2025 09:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Old certification exam news</title>
      <link>https://example.com/old</link>
      <description>Ten days old.</description>
      <pubDate>Mon, 10 Mar 2025 09:00:00 GMT</pubDate>
    </item>
    <item>
      <title>New certification exam announced</title>
      <description>No date on this one.</description>
    </item>
    <item>
      <title>Company picnic photos</title>
      <link>https://example.com/picnic</link>
      <description>Fun day out.</description>
      <pubDate>Tue, 18 Mar 2025 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Exam guide</title>
      <link>https://example.com/guide</link>
      <description>LONG_BODY</description>
      <pubDate>Tue, 18 Mar 2025 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Exam format changes</title>
      <link>https://example.com/format</link>
      <description>Details inside.</description>
      <pubDate>sometime next week</pubDate>
    </item>
  </channel>
</rss>"#;

const KUBERNETES_ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Kubernetes Blog</title>
  <id>https://kubernetes.io/blog/</id>
  <updated>2025-03-19T08:00:00Z</updated>
  <entry>
    <title>CKA exam curriculum update</title>
    <id>https://kubernetes.io/blog/cka-update</id>
    <link href="https://kubernetes.io/blog/cka-update"/>
    <updated>2025-03-19T08:00:00Z</updated>
    <summary>The CKA curriculum moves to v1.32.</summary>
  </entry>
</feed>"#;

fn context(keywords: &[String]) -> FeedContext<'_> {
    FeedContext {
        origin: Origin::new("aws", "AWS Training and Certification Blog", ItemKind::Feed),
        keywords,
        now: march(20),
        lookback_days: 7,
    }
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn recent_relevant_entries_are_kept() -> Result<()> {
    init_tracing();

    let keywords = keywords(&["certification", "exam"]);
    let ctx = context(&keywords);
    let feed = AWS_FEED.replace("LONG_BODY", &format!("exam {}", "x".repeat(800)));
    let items = items_from_feed(&feed, &ctx)?;

    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    info!("Kept {:?}", titles);
    assert_eq!(
        titles,
        vec![
            "AWS Certified Solutions Architect exam retiring",
            "New certification exam announced",
            "Exam guide",
            "Exam format changes",
        ]
    );

    let retiring = &items[0];
    assert_eq!(retiring.provider, "aws");
    assert_eq!(retiring.source, "AWS Training and Certification Blog");
    assert_eq!(retiring.kind, ItemKind::Feed);
    assert_eq!(retiring.url, "https://example.com/retiring");
    assert_eq!(retiring.summary, "The exam is retiring soon.");
    assert_eq!(retiring.published_date, Utc.with_ymd_and_hms(2025, 3, 17, 9, 0, 0).unwrap());
    assert_eq!(retiring.relevance_score, 50);
    assert_eq!(retiring.keywords_matched, vec!["exam"]);
    Ok(())
}

#[test]
fn undated_and_unparseable_entries_are_stamped_with_now() -> Result<()> {
    let keywords = keywords(&["certification", "exam"]);
    let ctx = context(&keywords);
    let items = items_from_feed(&AWS_FEED.replace("LONG_BODY", "exam"), &ctx)?;

    let undated = items.iter().find(|i| i.title == "New certification exam announced").unwrap();
    assert_eq!(undated.published_date, ctx.now);
    assert_eq!(undated.url, "");

    let garbled = items.iter().find(|i| i.title == "Exam format changes").unwrap();
    assert_eq!(garbled.published_date, ctx.now);
    Ok(())
}

#[test]
fn long_summaries_are_cut_with_ellipsis() -> Result<()> {
    let keywords = keywords(&["exam"]);
    let ctx = context(&keywords);
    let feed = AWS_FEED.replace("LONG_BODY", &format!("exam {}", "x".repeat(800)));
    let items = items_from_feed(&feed, &ctx)?;

    let guide = items.iter().find(|i| i.title == "Exam guide").unwrap();
    assert_eq!(guide.summary.chars().count(), 503);
    assert!(guide.summary.ends_with("..."));
    assert!(items.iter().all(|i| i.summary.chars().count() <= 503));
    assert!(items.iter().all(|i| i.title.chars().count() <= 200));
    Ok(())
}

#[test]
fn atom_entries_fall_back_to_updated() -> Result<()> {
    let keywords = keywords(&["CKA"]);
    let mut ctx = context(&keywords);
    ctx.origin = Origin::new("kubernetes", "Kubernetes Blog", ItemKind::Feed);

    let items = items_from_feed(KUBERNETES_ATOM, &ctx)?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].url, "https://kubernetes.io/blog/cka-update");
    assert_eq!(items[0].published_date, Utc.with_ymd_and_hms(2025, 3, 19, 8, 0, 0).unwrap());
    Ok(())
}

#[test]
fn malformed_feed_is_an_error() {
    let keywords = keywords(&["exam"]);
    assert!(items_from_feed("this is not a feed", &context(&keywords)).is_err());
}

#[test]
fn entry_on_the_cutoff_is_kept() {
    let keywords = keywords(&["exam"]);
    let ctx = context(&keywords);

    let on_cutoff = ParsedEntry {
        title: Some("Exam dates".to_string()),
        published: Some(ctx.now - Duration::days(7)),
        ..Default::default()
    };
    assert!(item_from_entry(&on_cutoff, &ctx).is_some());

    let just_before = ParsedEntry {
        published: Some(ctx.now - Duration::days(7) - Duration::seconds(1)),
        ..on_cutoff
    };
    assert!(item_from_entry(&just_before, &ctx).is_none());
}

#[test]
fn out_of_range_window_disables_the_cutoff() {
    let keywords = keywords(&["exam"]);
    let mut ctx = context(&keywords);
    ctx.lookback_days = 100_000_000;
    assert_eq!(ctx.cutoff(), None);

    let ancient = ParsedEntry {
        title: Some("Exam archive".to_string()),
        published: Some(Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap()),
        ..Default::default()
    };
    let item = item_from_entry(&ancient, &ctx).unwrap();
    assert_eq!(item.published_date.format("%Y").to_string(), "1999");
}

#[test]
fn missing_title_gets_placeholder() {
    let keywords = keywords(&["exam"]);
    let ctx = context(&keywords);
    let entry = ParsedEntry {
        summary: Some("New exam dates published".to_string()),
        ..Default::default()
    };

    let item = item_from_entry(&entry, &ctx).unwrap();
    assert_eq!(item.title, "No title");
    assert_eq!(item.url, "");
    assert_eq!(item.published_date, ctx.now);
}

#[test]
fn content_is_used_when_summary_is_missing() {
    let keywords = keywords(&["beta"]);
    let ctx = context(&keywords);
    let entry = ParsedEntry {
        title: Some("Weekly roundup".to_string()),
        content: Some("<div>A <em>beta</em> exam opens</div>".to_string()),
        ..Default::default()
    };

    let item = item_from_entry(&entry, &ctx).unwrap();
    assert_eq!(item.summary, "A beta exam opens");
    assert_eq!(item.keywords_matched, vec!["beta"]);
}

#[test]
fn clean_summary_strips_markup() {
    assert_eq!(clean_summary("<p>Hello<br/>  world</p>"), "Hello world");
    assert_eq!(clean_summary(""), "");
}
