use chrono::{Duration, Utc};
use rusqlite::{params, OptionalExtension, Result};

use super::Database;
use crate::error::FormSettingsError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Database {
    /// Store a value that reads as absent once `ttl` has elapsed. A `ttl`
    /// reaching past chrono's date range stores nothing.
    pub fn set_transient(
        &self,
        name: &str,
        value: &str,
        ttl: Duration,
    ) -> crate::error::Result<()> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(FormSettingsError::ExpiryOutOfRange(ttl))?
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO transients (name, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
            params![name, value, expires_at],
        )?;
        Ok(())
    }

    pub fn get_transient(&self, name: &str) -> Result<Option<String>> {
        let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let conn = self.conn();
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT value, expires_at FROM transients WHERE name = ?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((value, expires_at)) if expires_at > now => Ok(Some(value)),
            Some(_) => {
                conn.execute("DELETE FROM transients WHERE name = ?1", params![name])?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn delete_transient(&self, name: &str) -> Result<bool> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM transients WHERE name = ?1", params![name])?;
        Ok(deleted > 0)
    }
}
