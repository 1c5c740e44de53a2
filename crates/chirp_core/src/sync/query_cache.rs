//! Generic keyed snapshot cache with fetch supersession.

use std::collections::HashMap;
use std::hash::Hash;

/// Proof that a fetch for `key` was started; used to land its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<K> {
    key: K,
    generation: u64,
}

impl<K> FetchTicket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

/// Keyed cache of immutable snapshots.
///
/// Each key carries a fetch generation. Starting a fetch or invalidating a
/// key bumps it, so results of older fetches are rejected on arrival.
#[derive(Debug, Clone)]
pub struct QueryCache<K, V> {
    entries: HashMap<K, V>,
    generations: HashMap<K, u64>,
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            generations: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> QueryCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores a value directly, superseding any pending fetch for `key`.
    pub fn set(&mut self, key: K, value: V) {
        self.bump_generation(&key);
        self.entries.insert(key, value);
    }

    /// Starts a fetch for `key`. Any earlier ticket for the key goes stale.
    pub fn begin_fetch(&mut self, key: K) -> FetchTicket<K> {
        let generation = self.bump_generation(&key);
        FetchTicket { key, generation }
    }

    /// Returns whether `ticket` is still the latest fetch for its key.
    pub fn is_current(&self, ticket: &FetchTicket<K>) -> bool {
        self.generations.get(&ticket.key).copied() == Some(ticket.generation)
    }

    /// Lands a fetch result.
    ///
    /// `resolve` receives the currently cached value (if any) and returns the
    /// new snapshot. Returns `false` and drops the result when the ticket was
    /// superseded.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket<K>,
        resolve: impl FnOnce(Option<&V>) -> V,
    ) -> bool {
        if !self.is_current(&ticket) {
            return false;
        }
        let value = resolve(self.entries.get(&ticket.key));
        self.entries.insert(ticket.key, value);
        true
    }

    /// Replaces the snapshot under `key` with `transform(old)`.
    ///
    /// Returns `false` when nothing is cached under `key`.
    pub fn patch(&mut self, key: &K, transform: impl FnOnce(&V) -> V) -> bool {
        match self.entries.get_mut(key) {
            Some(value) => {
                *value = transform(value);
                true
            }
            None => false,
        }
    }

    /// Offers every cached snapshot to `transform`; `Some` replaces it.
    ///
    /// Returns the number of replaced snapshots.
    pub fn patch_each(&mut self, mut transform: impl FnMut(&K, &V) -> Option<V>) -> usize {
        let mut replaced = 0;
        for (key, value) in self.entries.iter_mut() {
            if let Some(next) = transform(key, value) {
                *value = next;
                replaced += 1;
            }
        }
        replaced
    }

    /// Drops the snapshot and supersedes pending fetches for `key`.
    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
        self.bump_generation(key);
    }

    fn bump_generation(&mut self, key: &K) -> u64 {
        let generation = self.generations.entry(key.clone()).or_insert(0);
        *generation += 1;
        *generation
    }
}

#[cfg(test)]
mod tests {
    use super::QueryCache;

    #[test]
    fn superseded_fetch_result_is_discarded() {
        let mut cache: QueryCache<&str, u32> = QueryCache::new();
        let first = cache.begin_fetch("home");
        let second = cache.begin_fetch("home");

        assert!(!cache.complete_fetch(first, |_| 1));
        assert!(cache.get(&"home").is_none());
        assert!(cache.complete_fetch(second, |_| 2));
        assert_eq!(cache.get(&"home"), Some(&2));
    }

    #[test]
    fn fetches_for_different_keys_do_not_supersede_each_other() {
        let mut cache: QueryCache<&str, u32> = QueryCache::new();
        let home = cache.begin_fetch("home");
        let all = cache.begin_fetch("all");
        assert!(cache.complete_fetch(home, |_| 1));
        assert!(cache.complete_fetch(all, |_| 2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalidate_drops_value_and_stales_pending_fetch() {
        let mut cache: QueryCache<&str, u32> = QueryCache::new();
        cache.set("home", 1);
        let pending = cache.begin_fetch("home");
        cache.invalidate(&"home");
        assert!(cache.get(&"home").is_none());
        assert!(!cache.complete_fetch(pending, |_| 3));
    }

    #[test]
    fn patch_on_missing_key_is_noop() {
        let mut cache: QueryCache<&str, u32> = QueryCache::new();
        assert!(!cache.patch(&"home", |value| value + 1));
        cache.set("home", 1);
        assert!(cache.patch(&"home", |value| value + 1));
        assert_eq!(cache.get(&"home"), Some(&2));
    }

    #[test]
    fn complete_fetch_sees_previous_snapshot() {
        let mut cache: QueryCache<&str, Vec<u32>> = QueryCache::new();
        cache.set("all", vec![1]);
        let next_page = cache.begin_fetch("all");
        assert!(cache.complete_fetch(next_page, |old| {
            let mut pages = old.cloned().unwrap_or_default();
            pages.push(2);
            pages
        }));
        assert_eq!(cache.get(&"all"), Some(&vec![1, 2]));
    }
}
