//! Like/follow relation model.
//!
//! A relation is existence-typed: a stored row means "liked"/"following",
//! no row means the opposite. Each (subject, object) pair has at most one row.

use crate::model::tweet::TweetId;
use crate::model::user::{User, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one like or follow row.
pub type RelationId = Uuid;

/// Relation family handled by the toggle service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Like,
    Follow,
}

/// Object side of a relation. The variant fixes the relation kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RelationObject {
    /// Liked tweet.
    Tweet(TweetId),
    /// Followed user.
    User(UserId),
}

impl RelationObject {
    pub fn kind(&self) -> RelationKind {
        match self {
            Self::Tweet(_) => RelationKind::Like,
            Self::User(_) => RelationKind::Follow,
        }
    }
}

/// Outcome of one toggle: the state the relation ended in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationState {
    /// `true` when the relation exists after the toggle.
    pub active: bool,
    /// Row id that was created, or that was deleted when `active == false`.
    pub record_id: RelationId,
    pub subject_id: UserId,
    pub object: RelationObject,
}

impl RelationState {
    pub fn kind(&self) -> RelationKind {
        self.object.kind()
    }
}

/// One follow edge seen from a profile: `user` is the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub id: RelationId,
    pub user: User,
}
