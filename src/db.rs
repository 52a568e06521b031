// SQLite persistence layer for the prediction session.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

use crate::prediction::{PredictionRecord, PredictionStore};

/// SQLite-backed persistence for prediction records and key-value session
/// state. The store is saved wholesale after every committed change.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS predictions (
                team_id    TEXT PRIMARY KEY,
                record     TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS session_meta (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Replace the persisted store with `store` in one transaction, so a
    /// crash mid-save never leaves a mix of old and new records.
    pub fn save_store(&self, store: &PredictionStore) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin save transaction")?;
        tx.execute("DELETE FROM predictions", [])
            .context("failed to clear previous predictions")?;

        let now = Utc::now().to_rfc3339();
        for (team_id, record) in store.iter() {
            let json = serde_json::to_string(record)
                .with_context(|| format!("failed to serialize record for {team_id}"))?;
            tx.execute(
                "INSERT INTO predictions (team_id, record, updated_at) VALUES (?1, ?2, ?3)",
                params![team_id, json, now],
            )
            .with_context(|| format!("failed to save record for {team_id}"))?;
        }
        tx.commit().context("failed to commit save transaction")
    }

    /// Load every persisted prediction record. Returns an empty store on a
    /// fresh database.
    pub fn load_store(&self) -> Result<PredictionStore> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT team_id, record FROM predictions")
            .context("failed to prepare load query")?;

        let rows = stmt
            .query_map([], |row| {
                let team_id: String = row.get(0)?;
                let json: String = row.get(1)?;
                Ok((team_id, json))
            })
            .context("failed to query predictions")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to read prediction rows")?;

        let mut store = PredictionStore::new();
        for (team_id, json) in rows {
            let record: PredictionRecord = serde_json::from_str(&json)
                .with_context(|| format!("corrupt stored record for {team_id}"))?;
            store.insert(team_id, record);
        }
        Ok(store)
    }

    /// Delete every prediction and all session metadata.
    pub fn clear(&self) -> Result<()> {
        self.conn()
            .execute_batch("DELETE FROM predictions; DELETE FROM session_meta;")
            .context("failed to clear session")
    }

    pub fn prediction_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))
            .context("failed to count predictions")?;
        Ok(count as usize)
    }

    /// Persist a small piece of session metadata (e.g. the active season).
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO session_meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .context("failed to save session metadata")?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM session_meta WHERE key = ?1")
            .context("failed to prepare metadata query")?;
        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query session metadata")?;
        match rows.next() {
            Some(row) => Ok(Some(row.context("failed to read metadata row")?)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
