use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{SessionStore, StoreError};
use crate::models::{SessionId, SessionState};

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionId, SessionState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionState>> {
        // Map operations never leave the map half-updated, so poisoning is ignored.
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        Ok(self.lock().get(id).cloned())
    }

    fn put(&self, id: &SessionId, state: &SessionState) -> Result<(), StoreError> {
        self.lock().insert(*id, state.clone());
        Ok(())
    }

    fn clear(&self, id: &SessionId) -> Result<(), StoreError> {
        self.lock().remove(id);
        Ok(())
    }
}
