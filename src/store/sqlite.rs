use super::types::{is_unset, Entry};
use super::Storage;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use rusqlite::OptionalExtension;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_rusqlite::Connection;
use tracing::{debug, info, warn};

const DB_FILE_NAME: &str = "entries.db";
const LOCK_FILE_NAME: &str = ".lock";

/// SQLite-backed entry engine.
///
/// Each record is one row keyed by entry id whose `body` column holds the
/// JSON-serialized [`Entry`]. WAL mode gives crash recovery; writes are
/// serialized by the connection's single background thread.
///
/// An advisory lock on `<dir>/.lock` is held from open until [`close`], so a
/// directory is only ever served by one engine.
///
/// [`close`]: Storage::close
pub struct SqliteStorage {
    dir: Option<PathBuf>,
    /// `None` once closed.
    conn: RwLock<Option<Connection>>,
    lock_file: Mutex<Option<std::fs::File>>,
}

impl SqliteStorage {
    /// Open (or create) the engine in `dir`.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let lock_file = Self::acquire_lock(&dir)?;

        let db_path = dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path).await?;

        conn.call(|conn: &mut rusqlite::Connection| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await?;
        Self::create_schema(&conn).await?;

        info!("Opened entry store at {:?}", db_path);

        Ok(Self {
            dir: Some(dir),
            conn: RwLock::new(Some(conn)),
            lock_file: Mutex::new(Some(lock_file)),
        })
    }

    /// Create an in-memory engine with no directory and no file lock.
    pub async fn new_ephemeral() -> Result<Self> {
        let conn = Connection::open(":memory:").await?;
        Self::create_schema(&conn).await?;

        Ok(Self {
            dir: None,
            conn: RwLock::new(Some(conn)),
            lock_file: Mutex::new(None),
        })
    }

    async fn create_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn: &mut rusqlite::Connection| {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS entries (
                    id TEXT PRIMARY KEY,
                    body TEXT NOT NULL
                );
                "#,
            )?;
            Ok(())
        })
        .await?;
        Ok(())
    }

    /// Take the exclusive advisory lock for `dir`, failing if it is held.
    fn acquire_lock(dir: &Path) -> Result<std::fs::File> {
        let lock_path = dir.join(LOCK_FILE_NAME);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| Error::Config(format!("Failed to open lock file {:?}: {}", lock_path, e)))?;

        if let Err(e) = FileExt::try_lock_exclusive(&file) {
            debug!("Lock acquisition failed: {} (kind: {:?})", e, e.kind());
            return Err(Error::StoreLocked(dir.display().to_string()));
        }

        // Owner PID is only for humans inspecting the directory.
        let _ = file.set_len(0);
        let _ = writeln!(file, "{}", std::process::id());
        debug!("Acquired advisory lock on {:?}", lock_path);
        Ok(file)
    }

    fn connection(&self) -> Result<Connection> {
        self.conn.read().clone().ok_or(Error::StoreClosed)
    }

    fn decode(id: &str, body: &str) -> Result<Entry> {
        serde_json::from_str(body).map_err(|e| Error::Decode {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn save(&self, mut entry: Entry) -> Result<Entry> {
        let conn = self.connection()?;

        let stored = conn
            .call(move |conn: &mut rusqlite::Connection| {
                let tx = conn.transaction()?;

                let previous: Option<String> = tx
                    .query_row(
                        "SELECT body FROM entries WHERE id = ?1",
                        rusqlite::params![entry.id],
                        |row| row.get(0),
                    )
                    .optional()?;

                // The first write's created_at is final.
                let first_created = previous
                    .as_deref()
                    .and_then(|body| serde_json::from_str::<Entry>(body).ok())
                    .map(|prior| prior.created_at)
                    .filter(|ts| !is_unset(ts));

                let now = Utc::now();
                entry.created_at = match first_created {
                    Some(ts) => ts,
                    None if is_unset(&entry.created_at) => now,
                    None => entry.created_at.min(now),
                };
                entry.updated_at = now.max(entry.created_at);

                let body = serde_json::to_string(&entry)
                    .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
                tx.execute(
                    "INSERT INTO entries (id, body) VALUES (?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET body = excluded.body",
                    rusqlite::params![entry.id, body],
                )?;
                tx.commit()?;
                Ok(entry)
            })
            .await?;

        debug!("Saved entry '{}'", stored.id);
        Ok(stored)
    }

    async fn load(&self, id: &str) -> Result<Entry> {
        let conn = self.connection()?;
        let key = id.to_string();

        let body: Option<String> = conn
            .call(move |conn: &mut rusqlite::Connection| {
                Ok(conn
                    .query_row(
                        "SELECT body FROM entries WHERE id = ?1",
                        rusqlite::params![key],
                        |row| row.get(0),
                    )
                    .optional()?)
            })
            .await?;

        let body = body.ok_or_else(|| Error::NotFound(id.to_string()))?;
        Self::decode(id, &body)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let conn = self.connection()?;
        let key = id.to_string();

        let removed = conn
            .call(move |conn: &mut rusqlite::Connection| {
                Ok(conn.execute(
                    "DELETE FROM entries WHERE id = ?1",
                    rusqlite::params![key],
                )?)
            })
            .await?;

        debug!("Deleted entry '{}' ({} row(s))", id, removed);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Entry>> {
        let conn = self.connection()?;

        let rows: Vec<(String, String)> = conn
            .call(|conn: &mut rusqlite::Connection| {
                let mut stmt = conn.prepare("SELECT id, body FROM entries ORDER BY id")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;

        let entries = rows
            .into_iter()
            .filter_map(|(id, body)| match Self::decode(&id, &body) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping undecodable entry: {}", e);
                    None
                }
            })
            .collect();

        Ok(entries)
    }

    async fn close(&self) -> Result<()> {
        let conn = self.conn.write().take();
        let Some(conn) = conn else {
            debug!("Entry store already closed");
            return Ok(());
        };

        let result = conn.close().await;

        if let Some(file) = self.lock_file.lock().take() {
            let _ = FileExt::unlock(&file);
        }

        result?;
        info!("Closed entry store");
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}
