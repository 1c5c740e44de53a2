//! Like/follow relation repository.
//!
//! # Responsibility
//! - Flip like and follow relations atomically.
//! - Answer point lookups for relation existence.
//!
//! # Invariants
//! - A toggle runs in one `IMMEDIATE` transaction: a conditional delete, then
//!   a conflict-aware insert only when nothing was deleted.
//! - The returned state is what the statements did, not what an earlier
//!   existence check saw.
//! - UNIQUE constraints keep at most one row per (subject, object) pair.

use crate::model::relation::{RelationId, RelationObject, RelationState};
use crate::model::tweet::TweetId;
use crate::repo::{
    ensure_connection_ready, parse_uuid, tweet_exists, user_exists, RepoError, RepoResult,
    TableRequirement,
};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use uuid::Uuid;

const REQUIRED_TABLES: &[TableRequirement] = &[
    TableRequirement {
        table: "tweet_likes",
        columns: &["id", "tweet_id", "user_id", "created_at"],
    },
    TableRequirement {
        table: "follows",
        columns: &["id", "follower_id", "target_id", "created_at"],
    },
];

/// Storage layout of one relation family.
struct RelationTable {
    table: &'static str,
    subject_column: &'static str,
    object_column: &'static str,
}

static LIKES: RelationTable = RelationTable {
    table: "tweet_likes",
    subject_column: "user_id",
    object_column: "tweet_id",
};

static FOLLOWS: RelationTable = RelationTable {
    table: "follows",
    subject_column: "follower_id",
    object_column: "target_id",
};

/// Repository interface for relation toggles.
pub trait RelationRepository {
    /// Flips the relation between `subject_id` and `object`.
    ///
    /// Fails with `UserNotFound`/`TweetNotFound` when either side is missing.
    fn toggle(&mut self, subject_id: &str, object: &RelationObject) -> RepoResult<RelationState>;
    /// Returns whether the relation currently exists.
    fn is_active(&self, subject_id: &str, object: &RelationObject) -> RepoResult<bool>;
}

/// SQLite-backed relation repository.
pub struct SqliteRelationRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRelationRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl RelationRepository for SqliteRelationRepository<'_> {
    fn toggle(&mut self, subject_id: &str, object: &RelationObject) -> RepoResult<RelationState> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !user_exists(&tx, subject_id)? {
            return Err(RepoError::UserNotFound(subject_id.to_string()));
        }
        ensure_object_exists(&tx, object)?;

        let (table, object_key) = relation_target(object);
        let (active, record_id) = flip_in_tx(&tx, table, subject_id, &object_key)?;
        tx.commit()?;

        debug!(
            "event=relation_toggle module=repo status=ok table={} active={} record_id={}",
            table.table, active, record_id
        );
        Ok(RelationState {
            active,
            record_id,
            subject_id: subject_id.to_string(),
            object: object.clone(),
        })
    }

    fn is_active(&self, subject_id: &str, object: &RelationObject) -> RepoResult<bool> {
        let (table, object_key) = relation_target(object);
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(
                    SELECT 1 FROM {} WHERE {} = ?1 AND {} = ?2
                );",
                table.table, table.subject_column, table.object_column
            ),
            params![subject_id, object_key],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn relation_target(object: &RelationObject) -> (&'static RelationTable, String) {
    match object {
        RelationObject::Tweet(tweet_id) => (&LIKES, tweet_id.to_string()),
        RelationObject::User(user_id) => (&FOLLOWS, user_id.clone()),
    }
}

fn ensure_object_exists(tx: &Transaction<'_>, object: &RelationObject) -> RepoResult<()> {
    match object {
        RelationObject::Tweet(tweet_id) => ensure_tweet_exists(tx, *tweet_id),
        RelationObject::User(user_id) => {
            if user_exists(tx, user_id)? {
                Ok(())
            } else {
                Err(RepoError::UserNotFound(user_id.clone()))
            }
        }
    }
}

fn ensure_tweet_exists(tx: &Transaction<'_>, tweet_id: TweetId) -> RepoResult<()> {
    if tweet_exists(tx, tweet_id)? {
        Ok(())
    } else {
        Err(RepoError::TweetNotFound(tweet_id))
    }
}

/// Deletes the relation row if present, otherwise inserts one.
///
/// Returns `(active, record_id)` after the flip.
fn flip_in_tx(
    tx: &Transaction<'_>,
    table: &RelationTable,
    subject_id: &str,
    object_key: &str,
) -> RepoResult<(bool, RelationId)> {
    let deleted: Option<String> = tx
        .query_row(
            &format!(
                "DELETE FROM {} WHERE {} = ?1 AND {} = ?2 RETURNING id;",
                table.table, table.subject_column, table.object_column
            ),
            params![subject_id, object_key],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(deleted_id) = deleted {
        return Ok((false, parse_uuid(&deleted_id, "relation.id")?));
    }

    let inserted: Option<String> = tx
        .query_row(
            &format!(
                "INSERT INTO {table} (id, {subject}, {object}) VALUES (?1, ?2, ?3)
                 ON CONFLICT ({subject}, {object}) DO NOTHING
                 RETURNING id;",
                table = table.table,
                subject = table.subject_column,
                object = table.object_column,
            ),
            params![Uuid::new_v4().to_string(), subject_id, object_key],
            |row| row.get(0),
        )
        .optional()?;
    match inserted {
        Some(inserted_id) => Ok((true, parse_uuid(&inserted_id, "relation.id")?)),
        None => Err(RepoError::Conflict(
            "relation row appeared between conditional delete and insert",
        )),
    }
}
