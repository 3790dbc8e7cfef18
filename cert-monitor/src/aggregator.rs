use crate::types::Item;
use std::collections::HashSet;
use tracing::{debug, info};

/// Merge items from every source into the final ranked list.
///
/// Items are deduplicated on `(url, title)` keeping the first occurrence,
/// dropped when below `min_relevance` (0 disables the threshold), and sorted
/// by relevance then publication date, both descending. Ties keep their
/// input order.
pub fn aggregate(items: Vec<Item>, min_relevance: u8) -> Vec<Item> {
    let total = items.len();
    let unique = dedup(items);
    let duplicates = total - unique.len();

    let mut ranked: Vec<Item> = unique
        .into_iter()
        .filter(|item| min_relevance == 0 || item.relevance_score >= min_relevance)
        .collect();

    ranked.sort_by(|a, b| {
        b.relevance_score
            .cmp(&a.relevance_score)
            .then_with(|| b.published_date.cmp(&a.published_date))
    });

    debug!(duplicates, min_relevance, "Aggregation pass");
    info!("Aggregated {} items into {} updates", total, ranked.len());
    ranked
}

fn dedup(items: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| {
            let (url, title) = item.dedup_key();
            seen.insert((url.to_string(), title.to_string()))
        })
        .collect()
}
