use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_tables()?;
        Ok(db)
    }

    /// A panic while holding the lock cannot leave SQLite half-written, so a
    /// poisoned mutex is still usable.
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn init_tables(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS options (
                option_name     TEXT PRIMARY KEY,
                option_value    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS transients (
                name            TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                expires_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS forms (
                id              INTEGER PRIMARY KEY,
                title           TEXT NOT NULL,
                content         TEXT NOT NULL DEFAULT '',
                mail_recipient  TEXT,
                status          TEXT NOT NULL DEFAULT 'publish'
            );

            CREATE INDEX IF NOT EXISTS idx_forms_status ON forms(status);
            ",
        )?;
        Ok(())
    }
}

// ── Sub-modules ─────────────────────────────────────────────

mod forms;
mod models;
mod options;
mod transients;

// ── Re-exports ──────────────────────────────────────────────

pub use models::FormRecord;
pub use options::OptionName;
