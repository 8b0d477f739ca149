pub mod friendship_repo;
pub mod interest_repo;
pub mod post_repo;
pub mod user_repo;

pub use friendship_repo::FriendshipRepository;
pub use interest_repo::InterestRepository;
pub use post_repo::PostRepository;
pub use user_repo::UserRepository;

use sqlx::migrate::Migrator;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
