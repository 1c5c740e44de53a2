//! Core use-case services.
//!
//! # Responsibility
//! - Turn repository calls into the operations callers see: post a tweet,
//!   read a feed page, toggle a relation, load a profile.
//! - Apply identity checks before any store access.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod feed_service;
pub mod relation_service;
pub mod tweet_service;
pub mod user_service;

/// Current wall clock in epoch milliseconds. A clock before 1970 reads as 0.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
