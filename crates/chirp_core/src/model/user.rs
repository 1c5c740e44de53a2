//! User identity model.
//!
//! Users are provisioned by the auth boundary; core code only reads them.
//! `name` and `image` stay optional here and fall back to display defaults in
//! [`crate::presentation`].

use crate::model::relation::FollowEdge;
use serde::{Deserialize, Serialize};

/// Opaque user identifier issued by the auth provider.
pub type UserId = String;

/// Public user identity shown next to tweets and in follow lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl User {
    /// Creates a user with no display name and no avatar.
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            image: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the avatar image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Returns whether the id is usable as a primary key.
    pub fn has_valid_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Profile read model with both sides of the follow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    /// Users following this user; `FollowEdge::user` is the follower.
    pub followers: Vec<FollowEdge>,
    /// Users this user follows; `FollowEdge::user` is the target.
    pub following: Vec<FollowEdge>,
}

impl UserProfile {
    pub fn is_followed_by(&self, user_id: &str) -> bool {
        self.followers.iter().any(|edge| edge.user.id == user_id)
    }

    pub fn follows(&self, user_id: &str) -> bool {
        self.following.iter().any(|edge| edge.user.id == user_id)
    }
}
