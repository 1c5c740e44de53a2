//! Client-side cache synchronization.
//!
//! # Responsibility
//! - Hold fetched feed pages and profiles in explicit keyed caches.
//! - Patch cached data after a toggle without refetching.
//! - Discard superseded fetches and gate concurrent toggles.
//!
//! # Invariants
//! - Cached values are immutable snapshots; a patch swaps in a new snapshot
//!   and leaves earlier ones intact.
//! - Patching data that is not cached is a no-op.
//! - The cache is never written back to the store.

mod client_cache;
mod feed_snapshot;
mod in_flight;
mod profile_patch;
mod query_cache;

pub use client_cache::ClientCache;
pub use feed_snapshot::FeedSnapshot;
pub use in_flight::{InFlight, MutationGate};
pub use profile_patch::patch_profile_follow;
pub use query_cache::{FetchTicket, QueryCache};
