//! Persistence layer
//!
//! SQLite-backed storage for:
//! - User accounts (username + password hash)
//! - Completed match results, one row per match
//!
//! Storage failures are surfaced as `StoreError` and are not retried.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod database;
mod store;

pub use database::Database;
pub use store::CredentialStore;

/// Errors from the storage layer. Callers treat these as fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("cannot prepare database location: {0}")]
    Io(#[from] std::io::Error),
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub password_hash: String,
    pub registered_at: DateTime<Utc>,
}

/// One completed match, as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: i64,
    pub username: String,
    pub played_at: DateTime<Utc>,
    pub player1_score: u32,
    pub player2_score: u32,
    pub winner: String,
}

/// Current time as stored in the database.
///
/// Fixed-width so that text ordering matches time ordering.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
