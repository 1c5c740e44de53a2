//! Feed query service.
//!
//! # Responsibility
//! - Resolve a [`FeedFilter`] to an author scope and read one page.
//! - Produce the continuation cursor for infinite scroll.
//!
//! # Invariants
//! - Pages are ordered by `created_at DESC, id DESC`.
//! - The service reads `page_size + 1` rows; the extra row only signals that
//!   another page exists and is never returned.
//! - `next_cursor` is the id of the last returned item. Passing it back
//!   yields the rows strictly after it, so chained pages never overlap or
//!   skip.
//! - Unknown authors and empty follow sets produce empty pages, not errors.

use crate::auth::{Unauthorized, Viewer};
use crate::config::normalize_page_size;
use crate::model::feed::{FeedFilter, FeedPage};
use crate::model::tweet::TweetId;
use crate::repo::tweet_repo::{AuthorScope, TweetPageQuery, TweetRepository};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum FeedError {
    Unauthorized,
    /// The cursor does not name a stored tweet.
    InvalidCursor(TweetId),
    Repo(RepoError),
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "{}", Unauthorized),
            Self::InvalidCursor(id) => write!(f, "unknown feed cursor: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Unauthorized> for FeedError {
    fn from(_: Unauthorized) -> Self {
        Self::Unauthorized
    }
}

impl From<RepoError> for FeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct FeedService<T: TweetRepository, U: UserRepository> {
    tweets: T,
    users: U,
}

impl<T: TweetRepository, U: UserRepository> FeedService<T, U> {
    pub fn new(tweets: T, users: U) -> Self {
        Self { tweets, users }
    }

    /// Reads one feed page.
    ///
    /// `page_size` follows the list contract: unset or `0` means 10, values
    /// above 50 are clamped.
    pub fn get_page(
        &self,
        filter: &FeedFilter,
        cursor: Option<TweetId>,
        page_size: Option<u32>,
    ) -> Result<FeedPage, FeedError> {
        let page_size = normalize_page_size(page_size);
        let authors = match filter {
            FeedFilter::AllTweets => AuthorScope::All,
            FeedFilter::ByAuthor(user_id) => AuthorScope::Only(vec![user_id.clone()]),
            FeedFilter::ByFollowingOf(user_id) => {
                let targets = self.users.following_ids(user_id)?;
                if targets.is_empty() {
                    debug!(
                        "event=feed_page module=service status=ok filter={} items=0 reason=no_follows",
                        filter_label(filter)
                    );
                    return Ok(FeedPage::empty());
                }
                AuthorScope::Only(targets)
            }
        };

        let query = TweetPageQuery {
            authors,
            after: cursor,
            limit: page_size + 1,
        };
        let mut items = self.tweets.list_tweets(&query).map_err(|err| match err {
            RepoError::TweetNotFound(id) if Some(id) == cursor => FeedError::InvalidCursor(id),
            other => FeedError::Repo(other),
        })?;

        let page_len = page_size as usize;
        let next_cursor = if items.len() > page_len {
            items.truncate(page_len);
            items.last().map(|tweet| tweet.id)
        } else {
            None
        };

        debug!(
            "event=feed_page module=service status=ok filter={} items={} has_more={}",
            filter_label(filter),
            items.len(),
            next_cursor.is_some()
        );
        Ok(FeedPage { items, next_cursor })
    }

    /// Global timeline.
    pub fn get_all(
        &self,
        cursor: Option<TweetId>,
        page_size: Option<u32>,
    ) -> Result<FeedPage, FeedError> {
        self.get_page(&FeedFilter::AllTweets, cursor, page_size)
    }

    /// Tweets authored by one user.
    pub fn get_all_by_user_id(
        &self,
        user_id: &str,
        cursor: Option<TweetId>,
        page_size: Option<u32>,
    ) -> Result<FeedPage, FeedError> {
        self.get_page(&FeedFilter::ByAuthor(user_id.to_string()), cursor, page_size)
    }

    /// Home timeline: tweets by users the viewer follows.
    pub fn get_by_following(
        &self,
        viewer: &Viewer,
        cursor: Option<TweetId>,
        page_size: Option<u32>,
    ) -> Result<FeedPage, FeedError> {
        let user_id = viewer.require()?;
        self.get_page(
            &FeedFilter::ByFollowingOf(user_id.to_string()),
            cursor,
            page_size,
        )
    }
}

fn filter_label(filter: &FeedFilter) -> &'static str {
    match filter {
        FeedFilter::AllTweets => "all",
        FeedFilter::ByAuthor(_) => "by_author",
        FeedFilter::ByFollowingOf(_) => "by_following",
    }
}
