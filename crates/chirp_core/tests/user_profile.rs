use chirp_core::db::open_db_in_memory;
use chirp_core::{
    RelationService, RepoError, SqliteRelationRepository, SqliteUserRepository, User,
    UserService, Viewer,
};
use rusqlite::Connection;

fn users(conn: &Connection) -> UserService<SqliteUserRepository<'_>> {
    UserService::new(SqliteUserRepository::try_new(conn).unwrap())
}

fn follow(conn: &mut Connection, follower: &str, target: &str) {
    RelationService::new(SqliteRelationRepository::try_new(conn).unwrap())
        .follow_or_unfollow(&Viewer::signed_in(follower), target)
        .unwrap();
}

#[test]
fn profile_lists_followers_and_following() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let users = users(&conn);
        users
            .register(&User::new("alice").with_name("Alice"))
            .unwrap();
        users.register(&User::new("bob").with_name("Bob")).unwrap();
        users.register(&User::new("carol")).unwrap();
    }
    follow(&mut conn, "bob", "alice");
    follow(&mut conn, "carol", "alice");
    follow(&mut conn, "alice", "bob");

    let alice = users(&conn).get_by_user_id("alice").unwrap().unwrap();
    assert_eq!(alice.user.name.as_deref(), Some("Alice"));
    let mut follower_ids: Vec<&str> = alice.followers.iter().map(|e| e.user.id.as_str()).collect();
    follower_ids.sort_unstable();
    assert_eq!(follower_ids, vec!["bob", "carol"]);
    let following_ids: Vec<&str> = alice.following.iter().map(|e| e.user.id.as_str()).collect();
    assert_eq!(following_ids, vec!["bob"]);
    assert!(alice.is_followed_by("carol"));
    assert!(alice.follows("bob"));
    assert!(!alice.follows("carol"));

    let carol = users(&conn).get_by_user_id("carol").unwrap().unwrap();
    assert!(carol.followers.is_empty());
    assert_eq!(carol.following.len(), 1);
    assert_eq!(carol.following[0].user.name.as_deref(), Some("Alice"));
}

#[test]
fn unknown_user_has_no_profile() {
    let conn = open_db_in_memory().unwrap();
    assert!(users(&conn).get_by_user_id("ghost").unwrap().is_none());
    assert!(users(&conn).get_user("ghost").unwrap().is_none());
}

#[test]
fn register_refreshes_profile_fields_and_keeps_relations() {
    let mut conn = open_db_in_memory().unwrap();
    users(&conn).register(&User::new("alice")).unwrap();
    users(&conn).register(&User::new("bob")).unwrap();
    follow(&mut conn, "bob", "alice");

    users(&conn)
        .register(&User::new("alice").with_name("Alice").with_image("https://img/a.png"))
        .unwrap();

    let alice = users(&conn).get_by_user_id("alice").unwrap().unwrap();
    assert_eq!(alice.user.image.as_deref(), Some("https://img/a.png"));
    assert!(alice.is_followed_by("bob"));
}

#[test]
fn blank_user_id_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let err = users(&conn).register(&User::new("  ")).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn profile_serializes_user_fields_inline() {
    let conn = open_db_in_memory().unwrap();
    users(&conn).register(&User::new("alice")).unwrap();

    let profile = users(&conn).get_by_user_id("alice").unwrap().unwrap();
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["id"], "alice");
    assert!(json["name"].is_null());
    assert_eq!(json["followers"], serde_json::json!([]));
    assert_eq!(json["following"], serde_json::json!([]));
}
