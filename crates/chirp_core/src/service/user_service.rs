//! User profile service.
//!
//! Users are written only through [`UserService::register`], the hand-off
//! point for the auth boundary.

use crate::model::user::{User, UserProfile};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoResult;
use log::info;

pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts or refreshes a user supplied by the auth boundary.
    pub fn register(&self, user: &User) -> RepoResult<()> {
        self.repo.upsert_user(user)?;
        info!("event=user_upsert module=service status=ok user_id={}", user.id);
        Ok(())
    }

    pub fn get_user(&self, user_id: &str) -> RepoResult<Option<User>> {
        self.repo.get_user(user_id)
    }

    /// Loads a profile with follower and following lists.
    ///
    /// Returns `None` for unknown users.
    pub fn get_by_user_id(&self, user_id: &str) -> RepoResult<Option<UserProfile>> {
        let Some(user) = self.repo.get_user(user_id)? else {
            return Ok(None);
        };
        Ok(Some(UserProfile {
            followers: self.repo.list_followers(user_id)?,
            following: self.repo.list_following(user_id)?,
            user,
        }))
    }
}
