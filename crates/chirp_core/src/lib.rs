//! Core domain logic for chirp.
//! This crate owns feed ordering, relation toggles and client cache patching.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod presentation;
pub mod repo;
pub mod service;
pub mod sync;

pub use auth::{Unauthorized, Viewer};
pub use crate::config::{normalize_page_size, ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::feed::{FeedFilter, FeedPage};
pub use model::relation::{FollowEdge, RelationId, RelationKind, RelationObject, RelationState};
pub use model::tweet::{
    validate_tweet_content, TweetId, TweetLike, TweetRecord, TweetValidationError,
    TWEET_CONTENT_MAX_CHARS,
};
pub use model::user::{User, UserId, UserProfile};
pub use repo::relation_repo::{RelationRepository, SqliteRelationRepository};
pub use repo::tweet_repo::{AuthorScope, SqliteTweetRepository, TweetPageQuery, TweetRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::feed_service::{FeedError, FeedService};
pub use service::relation_service::{RelationError, RelationService};
pub use service::tweet_service::{TweetService, TweetServiceError};
pub use service::user_service::UserService;
pub use sync::{ClientCache, FeedSnapshot, FetchTicket, InFlight, MutationGate, QueryCache};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
