//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users, tweets and
//!   relations.
//! - Keep SQL details out of services.
//!
//! # Invariants
//! - Repositories refuse connections that are not migrated to the latest
//!   schema version.
//! - Repository APIs return semantic errors (`TweetNotFound`, `UserNotFound`,
//!   `Conflict`) in addition to DB transport errors.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::tweet::{TweetId, TweetValidationError};
use crate::model::user::UserId;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod relation_repo;
pub mod tweet_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by user, tweet and relation storage.
#[derive(Debug)]
pub enum RepoError {
    Validation(TweetValidationError),
    Db(DbError),
    TweetNotFound(TweetId),
    UserNotFound(UserId),
    /// A toggle neither deleted nor inserted a row.
    Conflict(&'static str),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::TweetNotFound(id) => write!(f, "tweet not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Conflict(details) => write!(f, "relation conflict: {details}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TweetValidationError> for RepoError {
    fn from(value: TweetValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Table layout a repository depends on.
pub(crate) struct TableRequirement {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

/// Verifies schema version and required tables/columns on `conn`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    requirements: &[TableRequirement],
) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for requirement in requirements {
        if !table_exists(conn, requirement.table)? {
            return Err(RepoError::MissingRequiredTable(requirement.table));
        }
        for &column in requirement.columns {
            if !table_has_column(conn, requirement.table, column)? {
                return Err(RepoError::MissingRequiredColumn {
                    table: requirement.table,
                    column,
                });
            }
        }
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn user_exists(conn: &Connection, user_id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn tweet_exists(conn: &Connection, tweet_id: TweetId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tweets WHERE id = ?1);",
        [tweet_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
