use chirp_core::db::open_db_in_memory;
use chirp_core::{
    FeedService, SqliteTweetRepository, SqliteUserRepository, TweetService, TweetServiceError,
    TweetValidationError, User, UserService, Viewer,
};
use rusqlite::Connection;

fn register(conn: &Connection, ids: &[&str]) {
    let users = UserService::new(SqliteUserRepository::try_new(conn).unwrap());
    for id in ids {
        users.register(&User::new(*id)).unwrap();
    }
}

fn tweet_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM tweets;", [], |row| row.get(0)).unwrap()
}

#[test]
fn valid_content_is_stored_and_heads_the_author_feed() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, &["alice"]);
    let tweets = TweetService::new(SqliteTweetRepository::try_new(&conn).unwrap());
    let feed = FeedService::new(
        SqliteTweetRepository::try_new(&conn).unwrap(),
        SqliteUserRepository::try_new(&conn).unwrap(),
    );
    let alice = Viewer::signed_in("alice");

    for content in [
        "x".to_string(),
        "y".repeat(70),
        "z".repeat(140),
        "界".repeat(140),
    ] {
        let created = tweets.add(&alice, &content).unwrap();
        assert_eq!(created.content, content);
        assert_eq!(created.author.id, "alice");
        assert!(created.likes.is_empty());

        let page = feed.get_all_by_user_id("alice", None, None).unwrap();
        assert_eq!(page.items[0].id, created.id);
        assert_eq!(tweets.get(created.id).unwrap(), Some(created));
    }
}

#[test]
fn out_of_range_content_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, &["alice"]);
    let tweets = TweetService::new(SqliteTweetRepository::try_new(&conn).unwrap());
    let alice = Viewer::signed_in("alice");

    let empty = tweets.add(&alice, "").unwrap_err();
    assert!(matches!(
        empty,
        TweetServiceError::Validation(TweetValidationError::EmptyContent)
    ));

    let long = tweets.add(&alice, &"x".repeat(141)).unwrap_err();
    assert!(matches!(
        long,
        TweetServiceError::Validation(TweetValidationError::ContentTooLong { length: 141, .. })
    ));

    assert_eq!(tweet_count(&conn), 0);
}

#[test]
fn nul_in_content_is_a_validation_error_not_a_storage_failure() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, &["alice"]);
    let tweets = TweetService::new(SqliteTweetRepository::try_new(&conn).unwrap());
    let alice = Viewer::signed_in("alice");

    for content in ["\0", "hello\0", "\0world"] {
        let err = tweets.add(&alice, content).unwrap_err();
        assert!(
            matches!(
                err,
                TweetServiceError::Validation(TweetValidationError::ContainsNul { .. })
            ),
            "{err:?}"
        );
    }
    assert_eq!(tweet_count(&conn), 0);
}

#[test]
fn posting_requires_a_provisioned_identity() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, &["alice"]);
    let tweets = TweetService::new(SqliteTweetRepository::try_new(&conn).unwrap());

    let anonymous = tweets.add(&Viewer::anonymous(), "hello").unwrap_err();
    assert!(matches!(anonymous, TweetServiceError::Unauthorized));

    let unknown = tweets.add(&Viewer::signed_in("ghost"), "hello").unwrap_err();
    assert!(matches!(unknown, TweetServiceError::Unauthorized));

    assert_eq!(tweet_count(&conn), 0);
}

#[test]
fn tweets_posted_in_quick_succession_get_increasing_timestamps() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, &["alice"]);
    let tweets = TweetService::new(SqliteTweetRepository::try_new(&conn).unwrap());
    let alice = Viewer::signed_in("alice");

    let mut previous = tweets.add(&alice, "0").unwrap().created_at;
    for idx in 1..20 {
        let created_at = tweets.add(&alice, &idx.to_string()).unwrap().created_at;
        assert!(created_at > previous);
        previous = created_at;
    }
}

#[test]
fn tweet_record_serializes_with_client_field_names() {
    let conn = open_db_in_memory().unwrap();
    let users = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());
    users
        .register(&User::new("alice").with_name("Alice"))
        .unwrap();
    let tweets = TweetService::new(SqliteTweetRepository::try_new(&conn).unwrap());

    let created = tweets.add(&Viewer::signed_in("alice"), "hello").unwrap();
    let json = serde_json::to_value(&created).unwrap();
    assert_eq!(json["from"]["id"], "alice");
    assert_eq!(json["from"]["name"], "Alice");
    assert!(json["from"]["image"].is_null());
    assert!(json["createdAt"].is_i64());
    assert_eq!(json["likes"], serde_json::json!([]));
}
