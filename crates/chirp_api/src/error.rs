//! Transport error tags and domain error mapping.
//!
//! # Invariants
//! - Every domain error maps to exactly one [`ErrorCode`].
//! - Storage and data-integrity failures surface as
//!   `INTERNAL_SERVER_ERROR`; caller mistakes never do.

use chirp_core::db::DbError;
use chirp_core::{FeedError, RelationError, RepoError, TweetServiceError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable error tag returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed call payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::Unauthorized, "sign in required")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalServerError, message)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for ApiError {}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::internal(format!("database unavailable: {value}"))
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::bad_request(err.to_string()),
            RepoError::TweetNotFound(_) | RepoError::UserNotFound(_) => {
                Self::new(ErrorCode::NotFound, value.to_string())
            }
            RepoError::Conflict(_) => Self::new(ErrorCode::Conflict, value.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<TweetServiceError> for ApiError {
    fn from(value: TweetServiceError) -> Self {
        match value {
            TweetServiceError::Unauthorized => Self::unauthorized(),
            TweetServiceError::Validation(err) => Self::bad_request(err.to_string()),
            TweetServiceError::Repo(err) => err.into(),
        }
    }
}

impl From<FeedError> for ApiError {
    fn from(value: FeedError) -> Self {
        match value {
            FeedError::Unauthorized => Self::unauthorized(),
            FeedError::InvalidCursor(_) => Self::bad_request(value.to_string()),
            FeedError::Repo(err) => err.into(),
        }
    }
}

impl From<RelationError> for ApiError {
    fn from(value: RelationError) -> Self {
        match value {
            RelationError::Unauthorized => Self::unauthorized(),
            RelationError::SelfFollow => Self::bad_request(value.to_string()),
            RelationError::TweetNotFound(_) | RelationError::UserNotFound(_) => {
                Self::new(ErrorCode::NotFound, value.to_string())
            }
            RelationError::Conflict(_) => Self::new(ErrorCode::Conflict, value.to_string()),
            RelationError::Repo(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, ErrorCode};
    use chirp_core::{FeedError, RelationError, RepoError, TweetServiceError, TweetValidationError};
    use uuid::Uuid;

    #[test]
    fn error_code_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::InternalServerError).unwrap();
        assert_eq!(json, "\"INTERNAL_SERVER_ERROR\"");
        assert_eq!(ErrorCode::BadRequest.to_string(), "BAD_REQUEST");
    }

    #[test]
    fn caller_mistakes_map_to_client_codes() {
        let cases = [
            (
                ApiError::from(TweetServiceError::Validation(
                    TweetValidationError::EmptyContent,
                )),
                ErrorCode::BadRequest,
            ),
            (
                ApiError::from(FeedError::InvalidCursor(Uuid::new_v4())),
                ErrorCode::BadRequest,
            ),
            (ApiError::from(RelationError::SelfFollow), ErrorCode::BadRequest),
            (ApiError::from(FeedError::Unauthorized), ErrorCode::Unauthorized),
            (
                ApiError::from(RelationError::TweetNotFound(Uuid::new_v4())),
                ErrorCode::NotFound,
            ),
            (
                ApiError::from(RelationError::Conflict("tweet_likes")),
                ErrorCode::Conflict,
            ),
        ];
        for (error, code) in cases {
            assert_eq!(error.code, code, "{error}");
        }
    }

    #[test]
    fn storage_failures_are_internal() {
        let error = ApiError::from(RepoError::InvalidData("broken row".to_string()));
        assert_eq!(error.code, ErrorCode::InternalServerError);
        assert!(error.message.contains("broken row"));
    }
}
