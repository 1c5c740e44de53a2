//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `chirp_core` linkage and the configured store.
//! - Print the newest page of the global timeline.

use chirp_core::db::open_db;
use chirp_core::presentation::{display_name, handle};
use chirp_core::{
    init_logging_from_config, logging_status, CoreConfig, FeedService, SqliteTweetRepository,
    SqliteUserRepository,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("chirp_core ping={}", chirp_core::ping());
    println!("chirp_core version={}", chirp_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("chirp_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig::from_env()?;
    if init_logging_from_config(&config)? {
        if let Some((level, dir)) = logging_status() {
            println!("logging level={level} dir={}", dir.display());
        }
    }

    let conn = open_db(&config.db_path)?;
    let schema_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    println!("db path={} schema_version={schema_version}", config.db_path.display());

    let feed = FeedService::new(
        SqliteTweetRepository::try_new(&conn)?,
        SqliteUserRepository::try_new(&conn)?,
    );
    let page = feed.get_all(None, Some(config.page_size))?;
    println!("feed items={} has_more={}", page.items.len(), page.has_more());
    for tweet in &page.items {
        println!(
            "{} {} likes={} {}",
            display_name(&tweet.author),
            handle(&tweet.author),
            tweet.like_count(),
            tweet.content
        );
    }
    Ok(())
}
