//! Storage layer for watermedic.
//!
//! State lives in a small `SQLite` key-value table. The whole tracker state
//! is one JSON document under a single key, mirroring how the browser
//! version kept it in local storage.

pub mod migrations;
pub mod schema;
mod snapshot;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub use snapshot::PersistedState;

/// Key the tracker state is stored under.
pub const STATE_KEY: &str = "hydration_state";

/// Durable home for the tracker state.
pub trait StateGateway {
    /// Load the stored state, or `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptState`] when the stored record could not be
    /// decoded; the record has been removed by the time this returns.
    /// Returns other errors when the backing store cannot be read.
    fn load(&self) -> Result<Option<PersistedState>>;

    /// Replace the stored state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(&self, state: &PersistedState) -> Result<()>;

    /// Remove the stored state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be removed.
    fn clear(&self) -> Result<()>;
}

/// `SQLite`-backed key-value storage.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance.
    ///
    /// Used by tests and as the fallback when the database file is unusable.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn put_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!("Stored {} bytes under {}", value.len(), key);
        Ok(())
    }

    /// Delete the value stored under `key`.
    ///
    /// Returns `true` if a value was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_value(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the database
    /// file cannot be inspected.
    pub fn stats(&self) -> Result<StorageStats> {
        let updated_at: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?1",
                [STATE_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let has_state = updated_at.is_some();
        let last_saved = updated_at
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path)?.len()
        };

        Ok(StorageStats {
            has_state,
            last_saved,
            db_size_bytes,
        })
    }
}

impl StateGateway for Storage {
    fn load(&self) -> Result<Option<PersistedState>> {
        let Some(raw) = self.get_value(STATE_KEY)? else {
            debug!("No stored state found");
            return Ok(None);
        };

        match PersistedState::from_json(&raw) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!("Discarding corrupt stored state: {}", e);
                self.delete_value(STATE_KEY)?;
                Err(Error::CorruptState {
                    message: e.to_string(),
                })
            }
        }
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.put_value(STATE_KEY, &json)
    }

    fn clear(&self) -> Result<()> {
        if self.delete_value(STATE_KEY)? {
            info!("Cleared stored state");
        }
        Ok(())
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Whether a tracker state has been saved.
    pub has_state: bool,
    /// When the state was last saved.
    pub last_saved: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
