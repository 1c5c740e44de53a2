//! Feed query model.

use crate::model::tweet::{TweetId, TweetRecord};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Which tweets a feed shows. Also the key of the client feed cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "filter", content = "userId", rename_all = "snake_case")]
pub enum FeedFilter {
    AllTweets,
    ByAuthor(UserId),
    ByFollowingOf(UserId),
}

/// One page of a feed.
///
/// `next_cursor` is the id of the last item; `None` means end of feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    #[serde(rename = "tweets")]
    pub items: Vec<TweetRecord>,
    pub next_cursor: Option<TweetId>,
}

impl FeedPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}
