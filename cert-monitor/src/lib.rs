pub mod types;
pub mod utils;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod relevance;
pub mod traits;
pub mod sources;
pub mod aggregator;
pub mod monitor;
pub mod digest;
pub mod notify;

pub use types::*;
pub use aggregator::aggregate;
pub use config::{Settings, SourcesConfig};
pub use fetcher::Fetcher;
pub use monitor::{Monitor, ScanReport};
pub use notify::{Notifier, NotifierMux};
pub use relevance::Relevance;
pub use sources::{FeedAdapter, PageAdapter, PageStrategy};
pub use traits::SourceAdapter;
