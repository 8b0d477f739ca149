pub mod feed;
pub mod ranking;

pub use feed::{FeedService, FeedStore, PgFeedStore};
pub use ranking::compute_feed;
