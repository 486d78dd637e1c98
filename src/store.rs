use std::path::Path;

use log::info;
use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

pub const DB_FILE: &str = "muse.sqlite3";

/// Literal marker value a compatible workspace carries.
pub const DATA_VERSION: &str = "2";
pub const DATA_VERSION_KEY: &str = "muse_data_version";

pub const CLASSES_KEY: &str = "muse_classes";
pub const LESSONS_KEY: &str = "muse_lessons";
pub const JOURNALS_KEY: &str = "muse_journals";
pub const ATTENDANCE_KEY: &str = "muse_attendance";
pub const ASSIGNMENTS_KEY: &str = "muse_assignments";
pub const DIET_KEY: &str = "muse_diet";
pub const QNA_KEY: &str = "muse_qna";
pub const EVALUATIONS_KEY: &str = "muse_evaluations";
pub const PORTFOLIOS_KEY: &str = "muse_portfolios";
pub const EVENTS_KEY: &str = "muse_events";
pub const PRIVATE_REQUESTS_KEY: &str = "muse_private_requests";
pub const CHATS_KEY: &str = "muse_chats";
pub const NOTIFICATIONS_KEY: &str = "muse_notifications";

/// Slots wiped when the stored marker disagrees with DATA_VERSION.
/// Diet, assignments, chat and the rest survive the reset on purpose.
const LEGACY_RESET_KEYS: &[&str] = &[
    CLASSES_KEY,
    LESSONS_KEY,
    JOURNALS_KEY,
    ATTENDANCE_KEY,
    EVALUATIONS_KEY,
    PRIVATE_REQUESTS_KEY,
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("workspace io: {0}")]
    Io(#[from] std::io::Error),
    #[error("db: {0}")]
    Db(#[from] rusqlite::Error),
}

/// One JSON document per key. Every write replaces the whole value; there
/// are no partial updates at this layer.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(workspace: &Path) -> Result<Store, StoreError> {
        std::fs::create_dir_all(workspace)?;
        let conn = Connection::open(workspace.join(DB_FILE))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS slots(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        let store = Store { conn };
        store.run_version_gate()?;
        Ok(store)
    }

    /// Wipes slots written by incompatible older layouts, then stamps the
    /// marker. Calling this again with a matching marker is a no-op.
    pub fn run_version_gate(&self) -> Result<bool, StoreError> {
        let current = self.get(DATA_VERSION_KEY)?;
        if current.as_deref() == Some(DATA_VERSION) {
            return Ok(false);
        }
        let tx = self.conn.unchecked_transaction()?;
        for key in LEGACY_RESET_KEYS {
            tx.execute("DELETE FROM slots WHERE key = ?", [key])?;
        }
        tx.execute(
            "INSERT INTO slots(key, value) VALUES(?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (DATA_VERSION_KEY, DATA_VERSION),
        )?;
        tx.commit()?;
        info!(
            "reset {} legacy slot(s), data version now {}",
            LEGACY_RESET_KEYS.len(),
            DATA_VERSION
        );
        Ok(true)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?", [key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO slots(key, value) VALUES(?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
        Ok(())
    }

    /// Writes several slots in one transaction. Compound intents (request
    /// approval touches requests and lessons) flush through this so a
    /// failure leaves neither slot updated.
    pub fn put_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO slots(key, value) VALUES(?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                (*key, value),
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM slots WHERE key = ?", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_workspace(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn slot_round_trip() {
        let ws = temp_workspace("musead-store-roundtrip");
        let store = Store::open(&ws).expect("open");
        let doc = r#"[{"id":"l1","date":"2024-05-01"},{"id":"l2","date":"2024-05-02"}]"#;
        store.put(LESSONS_KEY, doc).expect("put");
        assert_eq!(store.get(LESSONS_KEY).expect("get").as_deref(), Some(doc));
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn version_gate_resets_once() {
        let ws = temp_workspace("musead-store-gate");
        let store = Store::open(&ws).expect("open");
        // open() already stamped the marker on a fresh workspace.
        assert_eq!(
            store.get(DATA_VERSION_KEY).expect("get").as_deref(),
            Some(DATA_VERSION)
        );

        // Simulate an old-format workspace: stale marker plus legacy data.
        store.put(DATA_VERSION_KEY, "1").expect("put marker");
        store.put(LESSONS_KEY, "[]").expect("put lessons");
        store.put(DIET_KEY, "[]").expect("put diet");

        assert!(store.run_version_gate().expect("gate"));
        assert_eq!(store.get(LESSONS_KEY).expect("get").as_deref(), None);
        // Diet is not part of the reset set.
        assert_eq!(store.get(DIET_KEY).expect("get").as_deref(), Some("[]"));

        // Second run must be a no-op.
        store.put(LESSONS_KEY, "[1]").expect("put lessons");
        assert!(!store.run_version_gate().expect("gate again"));
        assert_eq!(store.get(LESSONS_KEY).expect("get").as_deref(), Some("[1]"));
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn put_many_is_atomic_per_call() {
        let ws = temp_workspace("musead-store-many");
        let store = Store::open(&ws).expect("open");
        store
            .put_many(&[
                (PRIVATE_REQUESTS_KEY, "[\"r\"]".to_string()),
                (LESSONS_KEY, "[\"l\"]".to_string()),
            ])
            .expect("put_many");
        assert_eq!(
            store.get(PRIVATE_REQUESTS_KEY).expect("get").as_deref(),
            Some("[\"r\"]")
        );
        assert_eq!(
            store.get(LESSONS_KEY).expect("get").as_deref(),
            Some("[\"l\"]")
        );
        let _ = std::fs::remove_dir_all(ws);
    }
}
