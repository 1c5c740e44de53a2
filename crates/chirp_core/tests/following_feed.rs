use chirp_core::db::open_db_in_memory;
use chirp_core::{
    FeedError, FeedService, RelationService, SqliteRelationRepository, SqliteTweetRepository,
    SqliteUserRepository, TweetId, TweetService, User, UserService, Viewer,
};
use rusqlite::Connection;
use std::collections::HashSet;

fn register(conn: &Connection, ids: &[&str]) {
    let users = UserService::new(SqliteUserRepository::try_new(conn).unwrap());
    for id in ids {
        users.register(&User::new(*id)).unwrap();
    }
}

fn post(conn: &Connection, author: &str, content: &str) -> TweetId {
    TweetService::new(SqliteTweetRepository::try_new(conn).unwrap())
        .add(&Viewer::signed_in(author), content)
        .unwrap()
        .id
}

fn toggle_follow(conn: &mut Connection, follower: &str, target: &str) -> bool {
    let mut relations = RelationService::new(SqliteRelationRepository::try_new(conn).unwrap());
    relations
        .follow_or_unfollow(&Viewer::signed_in(follower), target)
        .unwrap()
        .active
}

fn home_contents(conn: &Connection, viewer: &str) -> Vec<String> {
    let feed = FeedService::new(
        SqliteTweetRepository::try_new(conn).unwrap(),
        SqliteUserRepository::try_new(conn).unwrap(),
    );
    feed.get_by_following(&Viewer::signed_in(viewer), None, Some(50))
        .unwrap()
        .items
        .into_iter()
        .map(|tweet| tweet.content)
        .collect()
}

#[test]
fn following_nobody_yields_empty_feed() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, &["alice", "bob"]);
    post(&conn, "alice", "hello");
    post(&conn, "bob", "mine");

    assert!(home_contents(&conn, "bob").is_empty());
}

#[test]
fn feed_is_union_of_followed_authors_in_descending_order() {
    let mut conn = open_db_in_memory().unwrap();
    register(&conn, &["alice", "bob", "carol", "dave"]);
    assert!(toggle_follow(&mut conn, "dave", "alice"));
    assert!(toggle_follow(&mut conn, "dave", "bob"));

    post(&conn, "alice", "a1");
    post(&conn, "carol", "c1");
    post(&conn, "bob", "b1");
    post(&conn, "dave", "d1");
    post(&conn, "alice", "a2");

    assert_eq!(home_contents(&conn, "dave"), vec!["a2", "b1", "a1"]);
}

#[test]
fn home_feed_cursor_chaining_covers_followed_authors_exactly_once() {
    let mut conn = open_db_in_memory().unwrap();
    register(&conn, &["alice", "bob", "carol", "dave"]);
    assert!(toggle_follow(&mut conn, "dave", "alice"));
    assert!(toggle_follow(&mut conn, "dave", "bob"));

    let authors = ["alice", "carol", "bob", "dave"];
    let mut expected = HashSet::new();
    for idx in 0..22 {
        let author = authors[idx % authors.len()];
        let id = post(&conn, author, &format!("{author} {idx}"));
        if author == "alice" || author == "bob" {
            expected.insert(id);
        }
    }
    assert_eq!(expected.len(), 11);

    let feed = FeedService::new(
        SqliteTweetRepository::try_new(&conn).unwrap(),
        SqliteUserRepository::try_new(&conn).unwrap(),
    );
    let dave = Viewer::signed_in("dave");
    let mut cursor = None;
    let mut sizes = Vec::new();
    let mut seen = Vec::new();
    loop {
        let page = feed.get_by_following(&dave, cursor, Some(4)).unwrap();
        sizes.push(page.items.len());
        seen.extend(page.items.iter().map(|tweet| (tweet.created_at, tweet.id)));
        assert!(page
            .items
            .iter()
            .all(|tweet| tweet.author.id == "alice" || tweet.author.id == "bob"));
        cursor = page.next_cursor;
        if cursor.is_none() {
            break;
        }
        assert!(sizes.len() < 10, "home feed pagination did not terminate");
    }

    assert_eq!(sizes, vec![4, 4, 3]);
    assert!(seen.windows(2).all(|pair| pair[0] > pair[1]));
    let ids: HashSet<TweetId> = seen.iter().map(|(_, id)| *id).collect();
    assert_eq!(ids.len(), seen.len());
    assert_eq!(ids, expected);
}

#[test]
fn follow_post_unfollow_scenario() {
    let mut conn = open_db_in_memory().unwrap();
    register(&conn, &["alice", "bob"]);

    assert!(toggle_follow(&mut conn, "bob", "alice"));
    post(&conn, "alice", "x");
    assert_eq!(home_contents(&conn, "bob"), vec!["x"]);

    assert!(!toggle_follow(&mut conn, "bob", "alice"));
    assert!(home_contents(&conn, "bob").is_empty());
}

#[test]
fn following_is_directional() {
    let mut conn = open_db_in_memory().unwrap();
    register(&conn, &["alice", "bob"]);
    assert!(toggle_follow(&mut conn, "bob", "alice"));
    post(&conn, "bob", "from bob");

    assert!(home_contents(&conn, "alice").is_empty());
}

#[test]
fn anonymous_viewer_has_no_home_feed() {
    let conn = open_db_in_memory().unwrap();
    let feed = FeedService::new(
        SqliteTweetRepository::try_new(&conn).unwrap(),
        SqliteUserRepository::try_new(&conn).unwrap(),
    );

    let err = feed
        .get_by_following(&Viewer::anonymous(), None, None)
        .unwrap_err();
    assert!(matches!(err, FeedError::Unauthorized));
}
