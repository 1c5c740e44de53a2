//! Tweet repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create tweets and read them back with author and likes resolved.
//! - Serve keyset-paginated feed scans.
//!
//! # Invariants
//! - Write paths validate content before any SQL mutation.
//! - Feed scans are ordered by `created_at DESC, id DESC`.
//! - `created_at` is strictly increasing in insertion order, so a tweet
//!   posted later never sorts after an earlier one.

use crate::model::relation::RelationId;
use crate::model::tweet::{validate_tweet_content, TweetId, TweetLike, TweetRecord};
use crate::model::user::{User, UserId};
use crate::repo::{
    ensure_connection_ready, parse_uuid, user_exists, RepoError, RepoResult, TableRequirement,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const REQUIRED_TABLES: &[TableRequirement] = &[
    TableRequirement {
        table: "tweets",
        columns: &["id", "user_id", "content", "created_at"],
    },
    TableRequirement {
        table: "tweet_likes",
        columns: &["id", "tweet_id", "user_id", "created_at"],
    },
    TableRequirement {
        table: "users",
        columns: &["id", "name", "image"],
    },
];

const TWEET_SELECT_SQL: &str = "SELECT
    t.id AS id,
    t.content AS content,
    t.created_at AS created_at,
    u.id AS author_id,
    u.name AS author_name,
    u.image AS author_image
FROM tweets t
INNER JOIN users u ON u.id = t.user_id";

/// Author restriction for a feed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorScope {
    All,
    /// Only tweets by these authors. An empty set matches nothing.
    Only(Vec<UserId>),
}

/// One keyset page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetPageQuery {
    pub authors: AuthorScope,
    /// Exclusive lower bound: rows strictly after this tweet in feed order.
    pub after: Option<TweetId>,
    /// Maximum rows to return.
    pub limit: u32,
}

/// Repository interface for tweet persistence and feed scans.
pub trait TweetRepository {
    /// Creates one tweet and returns its read model.
    ///
    /// `created_at` is a lower bound; storage bumps it past the newest
    /// existing tweet when needed.
    fn create_tweet(&self, author_id: &str, content: &str, created_at: i64)
        -> RepoResult<TweetRecord>;
    /// Loads one tweet by id.
    fn get_tweet(&self, tweet_id: TweetId) -> RepoResult<Option<TweetRecord>>;
    /// Returns up to `query.limit` tweets in feed order.
    ///
    /// Fails with `TweetNotFound` when `query.after` names an unknown tweet.
    fn list_tweets(&self, query: &TweetPageQuery) -> RepoResult<Vec<TweetRecord>>;
}

/// SQLite-backed tweet repository.
pub struct SqliteTweetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTweetRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl TweetRepository for SqliteTweetRepository<'_> {
    fn create_tweet(
        &self,
        author_id: &str,
        content: &str,
        created_at: i64,
    ) -> RepoResult<TweetRecord> {
        validate_tweet_content(content)?;
        if !user_exists(self.conn, author_id)? {
            return Err(RepoError::UserNotFound(author_id.to_string()));
        }

        let tweet_id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tweets (id, user_id, content, created_at)
             VALUES (
                ?1,
                ?2,
                ?3,
                MAX(?4, COALESCE((SELECT MAX(created_at) + 1 FROM tweets), ?4))
             );",
            params![tweet_id.to_string(), author_id, content, created_at],
        )?;

        self.get_tweet(tweet_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created tweet {tweet_id} missing on read-back"))
        })
    }

    fn get_tweet(&self, tweet_id: TweetId) -> RepoResult<Option<TweetRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TWEET_SELECT_SQL} WHERE t.id = ?1;"))?;
        let mut rows = stmt.query([tweet_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_tweet_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_tweets(&self, query: &TweetPageQuery) -> RepoResult<Vec<TweetRecord>> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        let mut sql = format!("{TWEET_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let AuthorScope::Only(authors) = &query.authors {
            if authors.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; authors.len()].join(", ");
            sql.push_str(&format!(" AND t.user_id IN ({placeholders})"));
            bind_values.extend(authors.iter().cloned().map(Value::Text));
        }

        if let Some(cursor) = query.after {
            let cursor_created_at = cursor_created_at(self.conn, cursor)?
                .ok_or(RepoError::TweetNotFound(cursor))?;
            sql.push_str(" AND (t.created_at < ? OR (t.created_at = ? AND t.id < ?))");
            bind_values.push(Value::Integer(cursor_created_at));
            bind_values.push(Value::Integer(cursor_created_at));
            bind_values.push(Value::Text(cursor.to_string()));
        }

        sql.push_str(" ORDER BY t.created_at DESC, t.id DESC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(query.limit)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tweets = Vec::new();
        while let Some(row) = rows.next()? {
            tweets.push(parse_tweet_row(self.conn, row)?);
        }
        Ok(tweets)
    }
}

fn cursor_created_at(conn: &Connection, cursor: TweetId) -> RepoResult<Option<i64>> {
    let created_at = conn
        .query_row(
            "SELECT created_at FROM tweets WHERE id = ?1;",
            [cursor.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(created_at)
}

fn parse_tweet_row(conn: &Connection, row: &Row<'_>) -> RepoResult<TweetRecord> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "tweets.id")?;
    let content: String = row.get("content")?;
    validate_tweet_content(&content).map_err(|err| {
        RepoError::InvalidData(format!("tweet {id} violates content rules: {err}"))
    })?;

    Ok(TweetRecord {
        id,
        author: User {
            id: row.get("author_id")?,
            name: row.get("author_name")?,
            image: row.get("author_image")?,
        },
        content,
        created_at: row.get("created_at")?,
        likes: load_likes_for_tweet(conn, id)?,
    })
}

fn load_likes_for_tweet(conn: &Connection, tweet_id: TweetId) -> RepoResult<Vec<TweetLike>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id
         FROM tweet_likes
         WHERE tweet_id = ?1
         ORDER BY created_at ASC, id ASC;",
    )?;
    let mut rows = stmt.query([tweet_id.to_string()])?;
    let mut likes = Vec::new();
    while let Some(row) = rows.next()? {
        let like_id: String = row.get("id")?;
        let like_id: RelationId = parse_uuid(&like_id, "tweet_likes.id")?;
        likes.push(TweetLike {
            id: like_id,
            tweet_id,
            user_id: row.get("user_id")?,
        });
    }
    Ok(likes)
}
