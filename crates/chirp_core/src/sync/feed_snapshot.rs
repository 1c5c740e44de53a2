//! Immutable multi-page feed snapshot and like patching.

use crate::model::feed::FeedPage;
use crate::model::relation::{RelationObject, RelationState};
use crate::model::tweet::{TweetId, TweetLike, TweetRecord};
use std::sync::Arc;

/// Pages fetched so far for one feed, oldest fetch first.
///
/// Pages are shared through `Arc`; a patch copies only the page that holds
/// the changed tweet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    pages: Vec<Arc<FeedPage>>,
}

impl FeedSnapshot {
    pub fn from_page(page: FeedPage) -> Self {
        Self {
            pages: vec![Arc::new(page)],
        }
    }

    /// Returns a snapshot with `page` appended (infinite scroll).
    pub fn with_page(&self, page: FeedPage) -> Self {
        let mut pages = self.pages.clone();
        pages.push(Arc::new(page));
        Self { pages }
    }

    pub fn pages(&self) -> &[Arc<FeedPage>] {
        &self.pages
    }

    /// All tweets across pages in feed order.
    pub fn tweets(&self) -> impl Iterator<Item = &TweetRecord> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    pub fn find_tweet(&self, tweet_id: TweetId) -> Option<&TweetRecord> {
        self.tweets().find(|tweet| tweet.id == tweet_id)
    }

    /// Cursor for the next page; `None` when empty or at end of feed.
    pub fn next_cursor(&self) -> Option<TweetId> {
        self.pages.last().and_then(|page| page.next_cursor)
    }

    pub fn has_next_page(&self) -> bool {
        self.next_cursor().is_some()
    }

    /// Applies a toggle result and returns the resulting snapshot.
    ///
    /// Follow results and likes on tweets that are not held leave the
    /// snapshot unchanged.
    pub fn apply_relation(&self, state: &RelationState) -> Self {
        self.patch_relation(state).unwrap_or_else(|| self.clone())
    }

    /// Like [`FeedSnapshot::apply_relation`] but returns `None` when no
    /// held tweet is affected.
    pub fn patch_relation(&self, state: &RelationState) -> Option<Self> {
        let RelationObject::Tweet(tweet_id) = &state.object else {
            return None;
        };

        let mut touched = false;
        let pages = self
            .pages
            .iter()
            .map(|page| match page.items.iter().position(|t| t.id == *tweet_id) {
                Some(index) => {
                    touched = true;
                    let mut patched = FeedPage::clone(page);
                    set_like(&mut patched.items[index], state);
                    Arc::new(patched)
                }
                None => Arc::clone(page),
            })
            .collect();

        touched.then_some(Self { pages })
    }
}

fn set_like(tweet: &mut TweetRecord, state: &RelationState) {
    tweet.likes.retain(|like| like.user_id != state.subject_id);
    if state.active {
        tweet.likes.push(TweetLike {
            id: state.record_id,
            tweet_id: tweet.id,
            user_id: state.subject_id.clone(),
        });
    }
}
