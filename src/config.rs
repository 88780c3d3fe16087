//! Environment configuration for the seed tool and the server.
//!
//! Everything is plain environment variables with working defaults, so a
//! bare `cargo run` against a local checkout just works.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "bank.db";
pub const DEFAULT_CSV_PATH: &str = "data/bank_branches.csv";
pub const DEFAULT_PORT: &str = "3000";

/// SQLite database path from `DATABASE_URL`.
///
/// Deployment configs often carry a `sqlite://` or `sqlite:///` scheme
/// prefix; only the path part matters here.
pub fn database_path() -> PathBuf {
    let raw = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    PathBuf::from(strip_sqlite_scheme(&raw))
}

fn strip_sqlite_scheme(url: &str) -> &str {
    url.strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .unwrap_or(url)
}

/// CSV extract path from `BANK_CSV`.
pub fn csv_path() -> PathBuf {
    env::var("BANK_CSV")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CSV_PATH))
}

/// Listen address from `PORT`.
pub fn bind_addr() -> String {
    let port = env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
    format!("0.0.0.0:{}", port)
}
