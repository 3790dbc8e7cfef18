use crate::types::{Item, ItemKind, Result};
use async_trait::async_trait;

/// A kind of external endpoint that can be turned into [`Item`]s.
///
/// Adapters hold no per-source state: each `collect` call handles exactly
/// one configured source and returns its items in discovery order.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Configuration for one source of this kind.
    type Source: Send + Sync;

    /// The item kind this adapter produces.
    fn kind(&self) -> ItemKind;

    /// Human-readable name of a configured source, for logging.
    fn source_name<'a>(&self, source: &'a Self::Source) -> &'a str;

    /// Fetch and convert one source. Errors are scoped to this source.
    async fn collect(&self, provider: &str, source: &Self::Source) -> Result<Vec<Item>>;
}
