//! Client cache facade: feed pages and profiles plus the toggle gate.

use crate::model::feed::{FeedFilter, FeedPage};
use crate::model::relation::{RelationKind, RelationState};
use crate::model::user::{User, UserId, UserProfile};
use crate::sync::feed_snapshot::FeedSnapshot;
use crate::sync::in_flight::{InFlight, MutationGate};
use crate::sync::profile_patch::patch_profile_follow;
use crate::sync::query_cache::{FetchTicket, QueryCache};
use std::sync::Arc;

/// Everything a client keeps between requests.
///
/// Owned by the view layer and passed explicitly; there is no process-wide
/// instance.
#[derive(Debug, Default)]
pub struct ClientCache {
    feeds: QueryCache<FeedFilter, FeedSnapshot>,
    profiles: QueryCache<UserId, Arc<UserProfile>>,
    gate: MutationGate,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&self, filter: &FeedFilter) -> Option<&FeedSnapshot> {
        self.feeds.get(filter)
    }

    pub fn profile(&self, user_id: &str) -> Option<&Arc<UserProfile>> {
        self.profiles.get(&user_id.to_string())
    }

    pub fn feeds_mut(&mut self) -> &mut QueryCache<FeedFilter, FeedSnapshot> {
        &mut self.feeds
    }

    pub fn profiles_mut(&mut self) -> &mut QueryCache<UserId, Arc<UserProfile>> {
        &mut self.profiles
    }

    pub fn gate(&self) -> &MutationGate {
        &self.gate
    }

    /// Starts a fetch of the first page of `filter`, superseding any
    /// earlier fetch for it (for example after a route change).
    pub fn begin_feed_fetch(&mut self, filter: FeedFilter) -> FetchTicket<FeedFilter> {
        self.feeds.begin_fetch(filter)
    }

    /// Lands a first-page fetch, replacing held pages.
    pub fn complete_first_page(
        &mut self,
        ticket: FetchTicket<FeedFilter>,
        page: FeedPage,
    ) -> bool {
        self.feeds.complete_fetch(ticket, |_| FeedSnapshot::from_page(page))
    }

    /// Lands a next-page fetch, appending to held pages.
    pub fn complete_next_page(
        &mut self,
        ticket: FetchTicket<FeedFilter>,
        page: FeedPage,
    ) -> bool {
        self.feeds.complete_fetch(ticket, |held| match held {
            Some(snapshot) => snapshot.with_page(page),
            None => FeedSnapshot::from_page(page),
        })
    }

    /// Claims the toggle slot for `kind`; `None` means ignore the click.
    pub fn try_begin_toggle(&self, kind: RelationKind) -> Option<InFlight> {
        self.gate.try_begin(kind)
    }

    /// Patches one cached feed with a toggle result.
    ///
    /// Returns `false` when the feed is not cached or holds no affected
    /// tweet.
    pub fn apply_to_feed(&mut self, filter: &FeedFilter, state: &RelationState) -> bool {
        let Some(patched) = self
            .feeds
            .get(filter)
            .and_then(|snapshot| snapshot.patch_relation(state))
        else {
            return false;
        };
        self.feeds.patch(filter, |_| patched)
    }

    /// Patches every cached feed that holds the liked tweet.
    ///
    /// Returns the number of feeds changed.
    pub fn apply_like(&mut self, state: &RelationState) -> usize {
        self.feeds.patch_each(|_, snapshot| snapshot.patch_relation(state))
    }

    /// Patches cached profiles of both users of a follow toggle.
    ///
    /// Returns the number of profiles changed.
    pub fn apply_follow(
        &mut self,
        state: &RelationState,
        follower: &User,
        target: &User,
    ) -> usize {
        self.profiles.patch_each(|_, profile| {
            patch_profile_follow(profile, state, follower, target).map(Arc::new)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ClientCache;
    use crate::model::feed::{FeedFilter, FeedPage};
    use crate::model::relation::{RelationKind, RelationObject, RelationState};
    use crate::model::tweet::TweetRecord;
    use crate::model::user::{User, UserProfile};
    use std::sync::Arc;
    use uuid::Uuid;

    fn page_with(tweet: &TweetRecord) -> FeedPage {
        FeedPage {
            items: vec![tweet.clone()],
            next_cursor: None,
        }
    }

    fn tweet() -> TweetRecord {
        TweetRecord {
            id: Uuid::new_v4(),
            author: User::new("alice"),
            content: "hello".to_string(),
            created_at: 1,
            likes: Vec::new(),
        }
    }

    #[test]
    fn route_change_discards_stale_first_page() {
        let mut cache = ClientCache::new();
        let stale = cache.begin_feed_fetch(FeedFilter::AllTweets);
        let fresh = cache.begin_feed_fetch(FeedFilter::AllTweets);
        let held = tweet();

        assert!(cache.complete_first_page(fresh, page_with(&held)));
        assert!(!cache.complete_first_page(stale, FeedPage::empty()));
        assert_eq!(cache.feed(&FeedFilter::AllTweets).unwrap().tweets().count(), 1);
    }

    #[test]
    fn like_is_applied_to_every_feed_holding_the_tweet() {
        let mut cache = ClientCache::new();
        let held = tweet();
        for filter in [
            FeedFilter::AllTweets,
            FeedFilter::ByAuthor("alice".to_string()),
        ] {
            let ticket = cache.begin_feed_fetch(filter);
            cache.complete_first_page(ticket, page_with(&held));
        }
        let other = cache.begin_feed_fetch(FeedFilter::ByAuthor("bob".to_string()));
        cache.complete_first_page(other, FeedPage::empty());

        let state = RelationState {
            active: true,
            record_id: Uuid::new_v4(),
            subject_id: "bob".to_string(),
            object: RelationObject::Tweet(held.id),
        };
        assert_eq!(cache.apply_like(&state), 2);
        assert!(cache
            .feed(&FeedFilter::AllTweets)
            .unwrap()
            .find_tweet(held.id)
            .unwrap()
            .is_liked_by("bob"));
        assert!(!cache.apply_to_feed(&FeedFilter::ByAuthor("bob".to_string()), &state));
    }

    #[test]
    fn next_page_appends_and_keeps_earlier_snapshot() {
        let mut cache = ClientCache::new();
        let first = tweet();
        let second = tweet();
        let ticket = cache.begin_feed_fetch(FeedFilter::AllTweets);
        cache.complete_first_page(
            ticket,
            FeedPage {
                items: vec![first.clone()],
                next_cursor: Some(first.id),
            },
        );
        let before = cache.feed(&FeedFilter::AllTweets).unwrap().clone();

        let ticket = cache.begin_feed_fetch(FeedFilter::AllTweets);
        assert!(cache.complete_next_page(ticket, page_with(&second)));
        let after = cache.feed(&FeedFilter::AllTweets).unwrap();
        assert_eq!(after.pages().len(), 2);
        assert!(Arc::ptr_eq(&before.pages()[0], &after.pages()[0]));
        assert_eq!(before.pages().len(), 1);
    }

    #[test]
    fn follow_patches_cached_profiles_and_gate_serializes_toggles() {
        let mut cache = ClientCache::new();
        let bob = User::new("bob");
        let alice = User::new("alice");
        cache.profiles_mut().set(
            "alice".to_string(),
            Arc::new(UserProfile {
                user: alice.clone(),
                followers: Vec::new(),
                following: Vec::new(),
            }),
        );

        let permit = cache.try_begin_toggle(RelationKind::Follow).unwrap();
        assert!(cache.try_begin_toggle(RelationKind::Follow).is_none());
        let state = RelationState {
            active: true,
            record_id: Uuid::new_v4(),
            subject_id: "bob".to_string(),
            object: RelationObject::User("alice".to_string()),
        };
        assert_eq!(cache.apply_follow(&state, &bob, &alice), 1);
        drop(permit);

        assert!(cache.profile("alice").unwrap().is_followed_by("bob"));
        assert!(!cache.gate().is_pending(RelationKind::Follow));
    }
}
