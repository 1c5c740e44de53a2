//! Tweet domain model.
//!
//! # Responsibility
//! - Define the tweet read model returned by feeds and by `tweet.add`.
//! - Validate tweet content before it reaches storage.
//!
//! # Invariants
//! - Content length is counted in Unicode scalar values, 1..=140.
//! - Content never contains NUL; SQLite `length()` stops counting at the
//!   first one, so the storage CHECK would see a different length.
//! - A tweet never changes after creation; only its like set does.

use crate::model::relation::RelationId;
use crate::model::user::{User, UserId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable tweet identifier. Also used as the feed pagination cursor.
pub type TweetId = Uuid;

/// Maximum tweet length in Unicode scalar values.
pub const TWEET_CONTENT_MAX_CHARS: usize = 140;

/// Content validation failure for tweet submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TweetValidationError {
    EmptyContent,
    ContentTooLong { length: usize, max: usize },
    /// Content holds a NUL character at this char index.
    ContainsNul { index: usize },
}

impl Display for TweetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "tweet content must not be empty"),
            Self::ContentTooLong { length, max } => write!(
                f,
                "tweet content is {length} characters, maximum is {max}"
            ),
            Self::ContainsNul { index } => {
                write!(f, "tweet content must not contain NUL (at character {index})")
            }
        }
    }
}

impl Error for TweetValidationError {}

/// Validates tweet content length and characters.
pub fn validate_tweet_content(content: &str) -> Result<(), TweetValidationError> {
    if let Some(index) = content.chars().position(|c| c == '\0') {
        return Err(TweetValidationError::ContainsNul { index });
    }
    let length = content.chars().count();
    if length == 0 {
        return Err(TweetValidationError::EmptyContent);
    }
    if length > TWEET_CONTENT_MAX_CHARS {
        return Err(TweetValidationError::ContentTooLong {
            length,
            max: TWEET_CONTENT_MAX_CHARS,
        });
    }
    Ok(())
}

/// One like edge as embedded in a tweet read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetLike {
    pub id: RelationId,
    pub tweet_id: TweetId,
    pub user_id: UserId,
}

/// Tweet read model with author and likes resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetRecord {
    pub id: TweetId,
    /// Serialized as `from` to match the client payload naming.
    #[serde(rename = "from")]
    pub author: User,
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Likes in creation order.
    pub likes: Vec<TweetLike>,
}

impl TweetRecord {
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|like| like.user_id == user_id)
    }
}
