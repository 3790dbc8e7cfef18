pub mod announcement_page;
pub mod rss_feed;

pub use announcement_page::{PageAdapter, PageStrategy};
pub use rss_feed::FeedAdapter;
