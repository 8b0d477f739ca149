pub mod feed;
pub mod posts;

pub use feed::{get_main_feed, FeedHandlerState, FeedQueryParams};
pub use posts::{get_all_tags, get_user_posts, PostsHandlerState};
