//! Tweet submission service.
//!
//! # Invariants
//! - Content is validated before the repository is touched.
//! - Only a signed-in, provisioned user can post.

use crate::auth::{Unauthorized, Viewer};
use crate::model::tweet::{validate_tweet_content, TweetId, TweetRecord, TweetValidationError};
use crate::repo::tweet_repo::TweetRepository;
use crate::repo::{RepoError, RepoResult};
use crate::service::now_epoch_ms;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum TweetServiceError {
    Unauthorized,
    Validation(TweetValidationError),
    Repo(RepoError),
}

impl Display for TweetServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "{}", Unauthorized),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TweetServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unauthorized => None,
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<Unauthorized> for TweetServiceError {
    fn from(_: Unauthorized) -> Self {
        Self::Unauthorized
    }
}

impl From<TweetValidationError> for TweetServiceError {
    fn from(value: TweetValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TweetServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub struct TweetService<R: TweetRepository> {
    repo: R,
}

impl<R: TweetRepository> TweetService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Posts a tweet as the viewer.
    ///
    /// # Contract
    /// - Anonymous viewers and viewers without a user row get `Unauthorized`.
    /// - Content outside 1..=140 characters gets `Validation`, with no write.
    pub fn add(&self, viewer: &Viewer, content: &str) -> Result<TweetRecord, TweetServiceError> {
        let author_id = viewer.require()?;
        validate_tweet_content(content)?;

        let tweet = match self.repo.create_tweet(author_id, content, now_epoch_ms()) {
            Ok(tweet) => tweet,
            Err(RepoError::UserNotFound(_)) => return Err(TweetServiceError::Unauthorized),
            Err(err) => return Err(err.into()),
        };

        info!(
            "event=tweet_add module=service status=ok tweet_id={} author_id={} chars={}",
            tweet.id,
            tweet.author.id,
            tweet.content.chars().count()
        );
        Ok(tweet)
    }

    pub fn get(&self, tweet_id: TweetId) -> RepoResult<Option<TweetRecord>> {
        self.repo.get_tweet(tweet_id)
    }
}
