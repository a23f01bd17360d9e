//! Durable SQLite-backed misfire store.
//!
//! `misfire_entries` maps task id → next fire time (Unix seconds);
//! `misfire_retries` holds the task ids pending catch-up.
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use cronward_core::CronwardError;

use crate::store::{from_unix, Entry, MisfireStore};

#[derive(Clone)]
pub struct SqliteMisfireStore {
    conn: Arc<Mutex<Connection>>,
}

fn storage_err(e: rusqlite::Error) -> CronwardError {
    CronwardError::Storage(e.to_string())
}

impl SqliteMisfireStore {
    /// Open or create the store at `db_path`.
    pub fn open(db_path: &str) -> Result<Self, CronwardError> {
        let conn = Connection::open(db_path)
            .map_err(|e| CronwardError::Storage(format!("open misfire store {db_path}: {e}")))?;
        let store = Self::init(conn)?;
        info!(path = %db_path, "Misfire store opened");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, CronwardError> {
        Self::init(Connection::open_in_memory().map_err(storage_err)?)
    }

    fn init(conn: Connection) -> Result<Self, CronwardError> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS misfire_entries (
                task_id   TEXT PRIMARY KEY,
                next_unix INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS misfire_retries (
                task_id   TEXT PRIMARY KEY
            );
            "#,
        )
        .map_err(storage_err)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a statement on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, CronwardError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| CronwardError::Storage("misfire store connection poisoned".into()))?;
            f(&conn).map_err(storage_err)
        })
        .await
        .map_err(|e| CronwardError::Storage(format!("misfire store task failed: {e}")))?
    }
}

#[async_trait]
impl MisfireStore for SqliteMisfireStore {
    async fn get_entry(&self, task_id: &str) -> Result<Option<Entry>, CronwardError> {
        let id = task_id.to_string();
        let secs = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT next_unix FROM misfire_entries WHERE task_id = ?1",
                    params![id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()
            })
            .await?;
        secs.map(|secs| from_unix(task_id, secs)).transpose()
    }

    async fn put_entry(&self, task_id: &str, next: DateTime<Utc>) -> Result<(), CronwardError> {
        let id = task_id.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                r#"INSERT INTO misfire_entries (task_id, next_unix) VALUES (?1, ?2)
                   ON CONFLICT(task_id) DO UPDATE SET next_unix = excluded.next_unix"#,
                params![id, next.timestamp()],
            )
        })
        .await?;
        Ok(())
    }

    async fn put_retry_entry(&self, task_id: &str) -> Result<(), CronwardError> {
        let id = task_id.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO misfire_retries (task_id) VALUES (?1)",
                params![id],
            )
        })
        .await?;
        Ok(())
    }

    async fn get_retry_entry_list(&self) -> Result<HashSet<String>, CronwardError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT task_id FROM misfire_retries")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<HashSet<_>>>()?;
            Ok(ids)
        })
        .await
    }

    async fn del_retry_entry(&self, task_id: &str) -> Result<(), CronwardError> {
        let id = task_id.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM misfire_retries WHERE task_id = ?1",
                params![id],
            )
        })
        .await?;
        Ok(())
    }
}
