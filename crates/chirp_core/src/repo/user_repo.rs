//! User and follow-graph repository.
//!
//! # Responsibility
//! - Persist users handed over by the auth boundary.
//! - Answer follow-graph reads: follower/following lists and target sets.
//!
//! # Invariants
//! - `upsert_user` never deletes a user, so follows and tweets survive a
//!   profile refresh.
//! - Follow lists are ordered by follow time, oldest first.

use crate::model::relation::FollowEdge;
use crate::model::user::{User, UserId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult, TableRequirement};
use rusqlite::{params, Connection, OptionalExtension, Row};

const REQUIRED_TABLES: &[TableRequirement] = &[
    TableRequirement {
        table: "users",
        columns: &["id", "name", "image"],
    },
    TableRequirement {
        table: "follows",
        columns: &["id", "follower_id", "target_id", "created_at"],
    },
];

/// Repository interface for users and follow-graph reads.
pub trait UserRepository {
    /// Inserts a user or refreshes name/image of an existing one.
    fn upsert_user(&self, user: &User) -> RepoResult<()>;
    /// Loads one user by id.
    fn get_user(&self, user_id: &str) -> RepoResult<Option<User>>;
    /// Lists users following `user_id`.
    fn list_followers(&self, user_id: &str) -> RepoResult<Vec<FollowEdge>>;
    /// Lists users `user_id` follows.
    fn list_following(&self, user_id: &str) -> RepoResult<Vec<FollowEdge>>;
    /// Returns ids of users `user_id` follows.
    fn following_ids(&self, user_id: &str) -> RepoResult<Vec<UserId>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn upsert_user(&self, user: &User) -> RepoResult<()> {
        if !user.has_valid_id() {
            return Err(RepoError::InvalidData("user id must not be blank".to_string()));
        }

        self.conn.execute(
            "INSERT INTO users (id, name, image) VALUES (?1, ?2, ?3)
             ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                image = excluded.image;",
            params![user.id.as_str(), user.name.as_deref(), user.image.as_deref()],
        )?;
        Ok(())
    }

    fn get_user(&self, user_id: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, image FROM users WHERE id = ?1;",
                [user_id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn list_followers(&self, user_id: &str) -> RepoResult<Vec<FollowEdge>> {
        load_follow_edges(
            self.conn,
            "SELECT f.id AS edge_id, u.id AS id, u.name AS name, u.image AS image
             FROM follows f
             INNER JOIN users u ON u.id = f.follower_id
             WHERE f.target_id = ?1
             ORDER BY f.created_at ASC, f.id ASC;",
            user_id,
        )
    }

    fn list_following(&self, user_id: &str) -> RepoResult<Vec<FollowEdge>> {
        load_follow_edges(
            self.conn,
            "SELECT f.id AS edge_id, u.id AS id, u.name AS name, u.image AS image
             FROM follows f
             INNER JOIN users u ON u.id = f.target_id
             WHERE f.follower_id = ?1
             ORDER BY f.created_at ASC, f.id ASC;",
            user_id,
        )
    }

    fn following_ids(&self, user_id: &str) -> RepoResult<Vec<UserId>> {
        let mut stmt = self.conn.prepare(
            "SELECT target_id
             FROM follows
             WHERE follower_id = ?1
             ORDER BY target_id ASC;",
        )?;
        let mut rows = stmt.query([user_id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        image: row.get("image")?,
    })
}

fn load_follow_edges(conn: &Connection, sql: &str, user_id: &str) -> RepoResult<Vec<FollowEdge>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([user_id])?;
    let mut edges = Vec::new();
    while let Some(row) = rows.next()? {
        let edge_id: String = row.get("edge_id")?;
        edges.push(FollowEdge {
            id: parse_uuid(&edge_id, "follows.id")?,
            user: parse_user_row(row)?,
        });
    }
    Ok(edges)
}
