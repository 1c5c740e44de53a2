//! Domain model for tweets, users and their relations.
//!
//! # Responsibility
//! - Define the records shared by feed, toggle and cache code.
//! - Own content validation rules that must hold before persistence.
//!
//! # Invariants
//! - Users are identified by the opaque id handed out by the auth boundary.
//! - Tweets, likes and follows are identified by generated UUIDs.

pub mod feed;
pub mod relation;
pub mod tweet;
pub mod user;
