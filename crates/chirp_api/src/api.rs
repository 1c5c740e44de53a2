//! Procedure router.
//!
//! # Responsibility
//! - Map `(operation, JSON input)` pairs onto core services.
//! - Wrap every outcome in an [`ApiResponse`] envelope.
//!
//! # Invariants
//! - Calls never panic; every failure becomes a tagged [`ApiError`].
//! - Protected operations reject anonymous viewers before reading input.
//! - Each call opens its own connection; SQLite transactions are the only
//!   coordination between concurrent calls.

use crate::error::{ApiError, ErrorCode};
use chirp_core::db::open_db;
use chirp_core::{
    CoreConfig, FeedService, RelationService, SqliteRelationRepository, SqliteTweetRepository,
    SqliteUserRepository, TweetId, TweetService, User, UserService, Viewer,
};
use log::{debug, warn};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Envelope returned by every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl ApiResponse {
    fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: ApiError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Procedures exposed by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    TweetAdd,
    TweetGetAll,
    TweetGetAllByUserId,
    TweetGetByFollowing,
    TweetLikeToggle,
    FollowToggle,
    UserGetByUserId,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Self::TweetAdd,
        Self::TweetGetAll,
        Self::TweetGetAllByUserId,
        Self::TweetGetByFollowing,
        Self::TweetLikeToggle,
        Self::FollowToggle,
        Self::UserGetByUserId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::TweetAdd => "tweet.add",
            Self::TweetGetAll => "tweet.getAll",
            Self::TweetGetAllByUserId => "tweet.getAllByUserId",
            Self::TweetGetByFollowing => "tweet.getByFollowing",
            Self::TweetLikeToggle => "tweetLike.likeOrUnLike",
            Self::FollowToggle => "follow.toggle",
            Self::UserGetByUserId => "user.getByUserId",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Whether the caller must be signed in.
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            Self::TweetAdd | Self::TweetGetByFollowing | Self::TweetLikeToggle | Self::FollowToggle
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AddTweetInput {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct PageInput {
    cursor: Option<TweetId>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AuthorPageInput {
    user_id: String,
    #[serde(default)]
    cursor: Option<TweetId>,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TweetIdInput {
    tweet_id: TweetId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UserIdInput {
    user_id: String,
}

/// Router bound to one store.
#[derive(Debug, Clone)]
pub struct Api {
    db_path: PathBuf,
    default_page_size: u32,
}

impl Api {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::from_config(&CoreConfig {
            db_path: db_path.into(),
            ..CoreConfig::default()
        })
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            db_path: config.db_path.clone(),
            default_page_size: config.page_size,
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Inserts or refreshes a user handed over by the auth layer.
    pub fn provision_user(&self, user: &User) -> Result<(), ApiError> {
        let conn = self.open()?;
        UserService::new(SqliteUserRepository::try_new(&conn)?).register(user)?;
        Ok(())
    }

    /// Runs one procedure call.
    pub fn call(&self, viewer: &Viewer, operation: &str, input: Value) -> ApiResponse {
        let result = match Operation::parse(operation) {
            Some(op) => self.dispatch(viewer, op, input),
            None => Err(ApiError::new(
                ErrorCode::NotFound,
                format!("unknown operation: {operation}"),
            )),
        };

        match result {
            Ok(data) => {
                debug!("event=api_call module=api status=ok op={operation}");
                ApiResponse::success(data)
            }
            Err(err) => {
                warn!(
                    "event=api_call module=api status=error op={operation} code={}",
                    err.code
                );
                ApiResponse::failure(err)
            }
        }
    }

    fn dispatch(&self, viewer: &Viewer, op: Operation, input: Value) -> Result<Value, ApiError> {
        if op.is_protected() && !viewer.is_signed_in() {
            return Err(ApiError::unauthorized());
        }

        match op {
            Operation::TweetAdd => {
                let input: AddTweetInput = parse_input(input)?;
                let conn = self.open()?;
                let tweet = TweetService::new(SqliteTweetRepository::try_new(&conn)?)
                    .add(viewer, &input.content)?;
                to_json(&tweet)
            }
            Operation::TweetGetAll => {
                let input: PageInput = parse_input(input)?;
                let conn = self.open()?;
                let page = feed_service(&conn)?
                    .get_all(input.cursor, Some(self.page_size(input.limit)))?;
                to_json(&page)
            }
            Operation::TweetGetAllByUserId => {
                let input: AuthorPageInput = parse_input(input)?;
                let conn = self.open()?;
                let page = feed_service(&conn)?.get_all_by_user_id(
                    &input.user_id,
                    input.cursor,
                    Some(self.page_size(input.limit)),
                )?;
                to_json(&page)
            }
            Operation::TweetGetByFollowing => {
                let input: PageInput = parse_input(input)?;
                let conn = self.open()?;
                let page = feed_service(&conn)?.get_by_following(
                    viewer,
                    input.cursor,
                    Some(self.page_size(input.limit)),
                )?;
                to_json(&page)
            }
            Operation::TweetLikeToggle => {
                let input: TweetIdInput = parse_input(input)?;
                let mut conn = self.open()?;
                let state = RelationService::new(SqliteRelationRepository::try_new(&mut conn)?)
                    .like_or_unlike(viewer, input.tweet_id)?;
                to_json(&state)
            }
            Operation::FollowToggle => {
                let input: UserIdInput = parse_input(input)?;
                let mut conn = self.open()?;
                let state = RelationService::new(SqliteRelationRepository::try_new(&mut conn)?)
                    .follow_or_unfollow(viewer, &input.user_id)?;
                to_json(&state)
            }
            Operation::UserGetByUserId => {
                let input: UserIdInput = parse_input(input)?;
                let conn = self.open()?;
                let profile = UserService::new(SqliteUserRepository::try_new(&conn)?)
                    .get_by_user_id(&input.user_id)?;
                to_json(&profile)
            }
        }
    }

    fn open(&self) -> Result<Connection, ApiError> {
        Ok(open_db(&self.db_path)?)
    }

    fn page_size(&self, requested: Option<u32>) -> u32 {
        match requested {
            Some(limit) if limit > 0 => limit,
            _ => self.default_page_size,
        }
    }
}

fn feed_service(
    conn: &Connection,
) -> Result<FeedService<SqliteTweetRepository<'_>, SqliteUserRepository<'_>>, ApiError> {
    Ok(FeedService::new(
        SqliteTweetRepository::try_new(conn)?,
        SqliteUserRepository::try_new(conn)?,
    ))
}

fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, ApiError> {
    let input = if input.is_null() {
        Value::Object(Default::default())
    } else {
        input
    };
    serde_json::from_value(input)
        .map_err(|err| ApiError::bad_request(format!("invalid input: {err}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|err| ApiError::internal(format!("response serialization failed: {err}")))
}
