use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use super::{schema, SessionStore, StoreError};
use crate::models::{SessionId, SessionState};

/// SQLite-backed session store. State is kept as a JSON document per session.
#[derive(Clone)]
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::Setup("Database path has no parent directory".to_string()))?;
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Setup(e.to_string()))?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf, StoreError> {
        let dirs = directories::ProjectDirs::from("", "", "emotion-canvas")
            .ok_or_else(|| StoreError::Setup("Could not determine data directory".to_string()))?;
        Ok(dirs.data_dir().join("sessions.db"))
    }

    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<(), StoreError> {
        let mut conn = self.lock();
        let version = schema::run_migrations(&mut conn)?;
        tracing::debug!("Session database at schema version {}", version);
        Ok(())
    }

    pub fn session_count(&self) -> Result<usize, StoreError> {
        let conn = self.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for SqliteSessionStore {
    fn get(&self, id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        let conn = self.lock();
        let state: Option<String> = conn
            .query_row(
                "SELECT state FROM sessions WHERE id = ?",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match state {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put(&self, id: &SessionId, state: &SessionState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.lock();

        conn.execute(
            "INSERT INTO sessions (id, state, step_index, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(id) DO UPDATE SET
                state = excluded.state,
                step_index = excluded.step_index,
                updated_at = excluded.updated_at",
            (id.to_string(), &json, state.step_index, &now),
        )?;
        Ok(())
    }

    fn clear(&self, id: &SessionId) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute("DELETE FROM sessions WHERE id = ?", [id.to_string()])?;
        Ok(())
    }
}
