//! SQLite connection wrapper with versioned migrations

use log::{info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

use super::StoreError;

/// Current schema version
pub(crate) const SCHEMA_VERSION: i32 = 1;

/// One long-lived SQLite connection
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        // Another instance may hold the write lock briefly
        conn.busy_timeout(Duration::from_secs(5))?;

        info!("Opened database at {}", path.display());
        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Private in-memory database, gone when dropped
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn schema_version(&self) -> Result<i32, StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    fn set_schema_version(&self, version: i32) -> Result<(), StoreError> {
        self.conn
            .execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<(), StoreError> {
        let current = self.schema_version()?;
        if current > SCHEMA_VERSION {
            warn!(
                "Database schema version {} is newer than this build ({})",
                current, SCHEMA_VERSION
            );
            return Ok(());
        }
        if current == SCHEMA_VERSION {
            return Ok(());
        }

        // Migration 1: accounts and match history
        if current < 1 {
            info!("Running migration 1: users and game_history");
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    registration_date TEXT NOT NULL
                );

                -- username is a soft reference to users.username
                CREATE TABLE IF NOT EXISTS game_history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT NOT NULL,
                    game_date TEXT NOT NULL,
                    player1_score INTEGER NOT NULL,
                    player2_score INTEGER NOT NULL,
                    winner TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_game_history_user
                    ON game_history(username, game_date DESC);
                "#,
            )?;
            self.set_schema_version(1)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table_columns(db: &Database, table: &str) -> Vec<String> {
        let mut stmt = db
            .conn()
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("Failed to prepare PRAGMA");
        stmt.query_map([], |row| row.get::<_, String>(1))
            .expect("Failed to get columns")
            .filter_map(Result::ok)
            .collect()
    }

    #[test]
    fn test_fresh_database_is_migrated() {
        let db = Database::open_in_memory().expect("Failed to create database");
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);

        let users = table_columns(&db, "users");
        for col in ["id", "username", "password_hash", "registration_date"] {
            assert!(users.contains(&col.to_string()), "users.{col} missing");
        }

        let history = table_columns(&db, "game_history");
        for col in [
            "id",
            "username",
            "game_date",
            "player1_score",
            "player2_score",
            "winner",
        ] {
            assert!(history.contains(&col.to_string()), "game_history.{col} missing");
        }
    }

    #[test]
    fn test_reopen_keeps_schema_and_data() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("pong.db");

        {
            let db = Database::open(&path).expect("Failed to create database");
            db.conn()
                .execute(
                    "INSERT INTO users (username, password_hash, registration_date)
                     VALUES ('bob', 'x', '2024-01-01T00:00:00+00:00')",
                    [],
                )
                .unwrap();
        }

        let db = Database::open(&path).expect("Failed to reopen database");
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let versions: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, 1, "migration must not be recorded twice");
    }
}
