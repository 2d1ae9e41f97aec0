//! Session storage.
//!
//! The state machine only depends on [`SessionStore`]; [`MemorySessionStore`]
//! keeps sessions for the life of the process and [`SqliteSessionStore`]
//! survives restarts.

mod memory;
mod schema;
mod sqlite;

use thiserror::Error;

use crate::models::{SessionId, SessionState};

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt session state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to prepare database: {0}")]
    Setup(String),

    #[error("Database schema version {found} is newer than this build supports ({supported})")]
    UnsupportedSchema { found: u32, supported: u32 },
}

/// Keyed storage for per-client session state.
pub trait SessionStore: Send + Sync {
    fn get(&self, id: &SessionId) -> Result<Option<SessionState>, StoreError>;

    /// Insert or replace the state stored under `id`.
    fn put(&self, id: &SessionId, state: &SessionState) -> Result<(), StoreError>;

    /// Forget the session. Clearing an unknown id is not an error.
    fn clear(&self, id: &SessionId) -> Result<(), StoreError>;
}
