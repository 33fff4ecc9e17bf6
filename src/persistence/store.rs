//! Accounts and match history

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{ErrorCode, OptionalExtension, params};
use std::path::Path;

use super::database::Database;
use super::{MatchRecord, StoreError, UserAccount, now_rfc3339};

/// Durable store for user accounts and their match history.
///
/// Holds one connection for its whole lifetime. The only rule it enforces is
/// username uniqueness; validation belongs to the caller.
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    /// Open the store backed by the database file at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            db: Database::open(path)?,
        })
    }

    /// Store that lives only in memory
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            db: Database::open_in_memory()?,
        })
    }

    pub fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        let exists = self.db.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            [username],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Insert a new user. Returns false if the username is taken; the existing
    /// row is left untouched.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<bool, StoreError> {
        let result = self.db.conn().execute(
            "INSERT INTO users (username, password_hash, registration_date)
             VALUES (?1, ?2, ?3)",
            params![username, password_hash, now_rfc3339()],
        );

        match result {
            Ok(_) => {
                info!("Created user {}", username);
                Ok(true)
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                debug!("Username {} already taken", username);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// True iff a user with exactly this name and hash exists
    pub fn verify_user(&self, username: &str, password_hash: &str) -> Result<bool, StoreError> {
        let ok = self.db.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 AND password_hash = ?2)",
            [username, password_hash],
            |row| row.get(0),
        )?;
        Ok(ok)
    }

    pub fn find_user(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        let user = self
            .db
            .conn()
            .query_row(
                "SELECT username, password_hash, registration_date FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(UserAccount {
                        username: row.get(0)?,
                        password_hash: row.get(1)?,
                        registered_at: parse_timestamp(row, 2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Append a completed match for `username`, stamped with the current time
    pub fn save_match_result(
        &self,
        username: &str,
        player1_score: u32,
        player2_score: u32,
        winner: &str,
    ) -> Result<(), StoreError> {
        self.db.conn().execute(
            "INSERT INTO game_history (username, game_date, player1_score, player2_score, winner)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![username, now_rfc3339(), player1_score, player2_score, winner],
        )?;
        info!(
            "Saved match for {}: {}-{} ({} wins)",
            username, player1_score, player2_score, winner
        );
        Ok(())
    }

    /// All matches for `username`, most recent first
    pub fn get_user_matches(&self, username: &str) -> Result<Vec<MatchRecord>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, username, game_date, player1_score, player2_score, winner
             FROM game_history
             WHERE username = ?1
             ORDER BY game_date DESC, id DESC",
        )?;
        let records = stmt
            .query_map([username], Self::map_match_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn match_count(&self, username: &str) -> Result<u64, StoreError> {
        let count: i64 = self.db.conn().query_row(
            "SELECT COUNT(*) FROM game_history WHERE username = ?1",
            [username],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn map_match_row(row: &rusqlite::Row) -> rusqlite::Result<MatchRecord> {
        Ok(MatchRecord {
            id: row.get(0)?,
            username: row.get(1)?,
            played_at: parse_timestamp(row, 2)?,
            player1_score: row.get(3)?,
            player2_score: row.get(4)?,
            winner: row.get(5)?,
        })
    }
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
