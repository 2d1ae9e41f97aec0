use emotion_canvas::db::{MemorySessionStore, SessionStore, SqliteSessionStore, StoreError};
use emotion_canvas::models::*;
use speculate2::speculate;

fn sample_state() -> SessionState {
    let mut state = SessionState::default();
    state.record_question("Question 1: How do you feel?");
    state.advance();
    state.record_response("excited");
    state.record_question("Question 2: Where do you feel it?");
    state.advance();
    state
}

fn exercise_store(store: &dyn SessionStore) {
    let id = SessionId::new();
    assert!(store.get(&id).expect("get failed").is_none());

    let state = sample_state();
    store.put(&id, &state).expect("put failed");
    assert_eq!(store.get(&id).expect("get failed"), Some(state));

    store.clear(&id).expect("clear failed");
    assert!(store.get(&id).expect("get failed").is_none());
    store.clear(&id).expect("clearing twice failed");
}

speculate! {
    describe "memory store" {
        before {
            let store = MemorySessionStore::new();
        }

        it "supports get, put and clear" {
            exercise_store(&store);
            assert!(store.is_empty());
        }

        it "keys sessions independently" {
            let a = SessionId::new();
            let b = SessionId::new();
            store.put(&a, &sample_state()).expect("put failed");
            store.put(&b, &SessionState::default()).expect("put failed");

            store.clear(&a).expect("clear failed");

            assert_eq!(store.len(), 1);
            assert_eq!(store.get(&b).expect("get failed"), Some(SessionState::default()));
        }
    }

    describe "sqlite store" {
        before {
            let store = SqliteSessionStore::open_memory().expect("Failed to open database");
            store.migrate().expect("Failed to run migrations");
        }

        it "supports get, put and clear" {
            exercise_store(&store);
            assert_eq!(store.session_count().expect("count failed"), 0);
        }

        it "replaces state on put" {
            let id = SessionId::new();
            store.put(&id, &SessionState::default()).expect("put failed");
            let state = sample_state();
            store.put(&id, &state).expect("put failed");

            assert_eq!(store.session_count().expect("count failed"), 1);
            assert_eq!(store.get(&id).expect("get failed").expect("missing").step_index, 3);
        }

        it "persists sessions across reopen" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("nested").join("sessions.db");
            let id = SessionId::new();

            {
                let disk = SqliteSessionStore::open(path.clone()).expect("Failed to open");
                disk.migrate().expect("Failed to migrate");
                disk.put(&id, &sample_state()).expect("put failed");
            }

            let reopened = SqliteSessionStore::open(path).expect("Failed to reopen");
            reopened.migrate().expect("Failed to migrate");
            assert_eq!(reopened.get(&id).expect("get failed"), Some(sample_state()));
        }

        it "refuses a database written by a newer build" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("sessions.db");

            {
                let disk = SqliteSessionStore::open(path.clone()).expect("Failed to open");
                disk.migrate().expect("Failed to migrate");
            }
            rusqlite::Connection::open(&path)
                .expect("Failed to open raw connection")
                .execute(
                    "INSERT INTO schema_migrations (version, name, applied_at) VALUES (99, 'future', 'now')",
                    [],
                )
                .expect("Failed to record future version");

            let reopened = SqliteSessionStore::open(path).expect("Failed to reopen");
            let result = reopened.migrate();

            assert!(matches!(
                result,
                Err(StoreError::UnsupportedSchema { found: 99, supported: 1 })
            ));
        }
    }
}
