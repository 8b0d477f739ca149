pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;

pub use cache::{CacheConfig, RelationCache};
pub use config::Config;
pub use error::{AppError, Result};
pub use services::feed::{FeedService, FeedStore, PgFeedStore};
pub use services::ranking::compute_feed;
