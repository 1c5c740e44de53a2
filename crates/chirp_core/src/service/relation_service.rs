//! Like/follow toggle service.
//!
//! # Invariants
//! - Every toggle needs a signed-in, provisioned viewer.
//! - Users cannot follow themselves; liking one's own tweet is allowed.
//! - Missing tweets and missing follow targets fail with typed not-found
//!   errors, never with a silent no-op.

use crate::auth::{Unauthorized, Viewer};
use crate::model::relation::{RelationObject, RelationState};
use crate::model::tweet::TweetId;
use crate::model::user::UserId;
use crate::repo::relation_repo::RelationRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum RelationError {
    Unauthorized,
    SelfFollow,
    TweetNotFound(TweetId),
    UserNotFound(UserId),
    Conflict(&'static str),
    Repo(RepoError),
}

impl Display for RelationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "{}", Unauthorized),
            Self::SelfFollow => write!(f, "users cannot follow themselves"),
            Self::TweetNotFound(id) => write!(f, "tweet not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Conflict(details) => write!(f, "relation conflict: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RelationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Unauthorized> for RelationError {
    fn from(_: Unauthorized) -> Self {
        Self::Unauthorized
    }
}

impl From<RepoError> for RelationError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TweetNotFound(id) => Self::TweetNotFound(id),
            RepoError::UserNotFound(id) => Self::UserNotFound(id),
            RepoError::Conflict(details) => Self::Conflict(details),
            other => Self::Repo(other),
        }
    }
}

pub struct RelationService<R: RelationRepository> {
    repo: R,
}

impl<R: RelationRepository> RelationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Flips the viewer's relation to `object` and returns the new state.
    pub fn toggle(
        &mut self,
        viewer: &Viewer,
        object: RelationObject,
    ) -> Result<RelationState, RelationError> {
        let subject_id = viewer.require()?;
        if let RelationObject::User(target_id) = &object {
            if target_id == subject_id {
                return Err(RelationError::SelfFollow);
            }
        }

        match self.repo.toggle(subject_id, &object) {
            Ok(state) => {
                info!(
                    "event=relation_toggle module=service status=ok kind={:?} subject_id={} active={}",
                    state.kind(),
                    state.subject_id,
                    state.active
                );
                Ok(state)
            }
            Err(RepoError::UserNotFound(id)) if id == subject_id => {
                Err(RelationError::Unauthorized)
            }
            Err(err) => {
                warn!(
                    "event=relation_toggle module=service status=error kind={:?} subject_id={} error={}",
                    object.kind(),
                    subject_id,
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Likes the tweet, or removes the viewer's like.
    pub fn like_or_unlike(
        &mut self,
        viewer: &Viewer,
        tweet_id: TweetId,
    ) -> Result<RelationState, RelationError> {
        self.toggle(viewer, RelationObject::Tweet(tweet_id))
    }

    /// Follows the target user, or unfollows.
    pub fn follow_or_unfollow(
        &mut self,
        viewer: &Viewer,
        target_id: &str,
    ) -> Result<RelationState, RelationError> {
        self.toggle(viewer, RelationObject::User(target_id.to_string()))
    }

    /// Returns whether the viewer currently holds the relation.
    ///
    /// Anonymous viewers hold no relations.
    pub fn is_active(
        &self,
        viewer: &Viewer,
        object: &RelationObject,
    ) -> Result<bool, RelationError> {
        match viewer.user_id() {
            Some(subject_id) => Ok(self.repo.is_active(subject_id, object)?),
            None => Ok(false),
        }
    }
}
