use rusqlite::{params, OptionalExtension, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Database;
use crate::error::FormSettingsError;

/// The whole-document option blobs this crate owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionName {
    Recipients,
    ValidationRules,
    EmailTemplates,
    ErrorLogs,
    Settings,
}

impl OptionName {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionName::Recipients => "form_settings_recipients",
            OptionName::ValidationRules => "form_settings_validation_rules",
            OptionName::EmailTemplates => "form_settings_email_templates",
            OptionName::ErrorLogs => "form_settings_error_logs",
            OptionName::Settings => "form_settings_options",
        }
    }
}

impl Database {
    pub fn get_option(&self, name: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT option_value FROM options WHERE option_name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()
    }

    pub fn update_option(&self, name: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO options (option_name, option_value) VALUES (?1, ?2)
             ON CONFLICT(option_name) DO UPDATE SET option_value = excluded.option_value",
            params![name, value],
        )?;
        Ok(())
    }

    /// Insert only when absent. Returns true if the option was created.
    pub fn add_option(&self, name: &str, value: &str) -> Result<bool> {
        let conn = self.conn();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO options (option_name, option_value) VALUES (?1, ?2)",
            params![name, value],
        )?;
        Ok(inserted > 0)
    }

    pub fn delete_option(&self, name: &str) -> Result<bool> {
        let conn = self.conn();
        let deleted = conn.execute(
            "DELETE FROM options WHERE option_name = ?1",
            params![name],
        )?;
        Ok(deleted > 0)
    }

    /// Read a whole document. Missing or unparseable documents yield the default.
    pub fn load_document<T>(&self, name: OptionName) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.get_option(name.as_str())? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                log::warn!("Option {} is malformed, using default: {}", name.as_str(), e);
                Ok(T::default())
            }
        }
    }

    /// Replace a whole document.
    pub fn save_document<T>(&self, name: OptionName, doc: &T) -> Result<(), FormSettingsError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(doc)?;
        self.update_option(name.as_str(), &json)?;
        Ok(())
    }

    /// Seed a document unless one is already stored.
    pub fn add_document<T>(&self, name: OptionName, doc: &T) -> Result<bool, FormSettingsError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(doc)?;
        Ok(self.add_option(name.as_str(), &json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_then_get() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_option("missing").unwrap(), None);
        db.update_option("k", "1").unwrap();
        db.update_option("k", "2").unwrap();
        assert_eq!(db.get_option("k").unwrap().as_deref(), Some("2"));
        assert!(db.delete_option("k").unwrap());
        assert!(!db.delete_option("k").unwrap());
    }

    #[test]
    fn test_add_option_never_overwrites() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.add_option("k", "first").unwrap());
        assert!(!db.add_option("k", "second").unwrap());
        assert_eq!(db.get_option("k").unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn test_malformed_document_reads_as_default() {
        let db = Database::open_in_memory().unwrap();
        db.update_option(OptionName::Recipients.as_str(), "{not json").unwrap();
        let recipients: Vec<String> = db.load_document(OptionName::Recipients).unwrap();
        assert!(recipients.is_empty());
    }
}
