//! Request identity supplied by the auth boundary.
//!
//! # Invariants
//! - Every mutation requires a signed-in viewer.
//! - Reads accept anonymous viewers unless the feed is viewer-relative.

use crate::model::user::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Returned when an operation needs an identity and the viewer has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthorized;

impl Display for Unauthorized {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sign-in required")
    }
}

impl Error for Unauthorized {}

/// Identity attached to one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    user_id: Option<UserId>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// Returns the signed-in user id or [`Unauthorized`].
    pub fn require(&self) -> Result<&str, Unauthorized> {
        self.user_id().ok_or(Unauthorized)
    }
}
