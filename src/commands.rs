//! The admin command surface.
//!
//! Each command takes the shared [`AppState`] plus its parameters and
//! returns `Result<_, String>`, the shape the admin UI renders directly.
//! Authentication and permission checks happen before a command is called.

use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::db::Database;

mod config_cmds;
mod data;
mod recipients;
mod rules;
mod scanner;
mod templates;
mod updates;

pub use config_cmds::*;
pub use data::*;
pub use recipients::*;
pub use rules::*;
pub use scanner::*;
pub use templates::*;
pub use updates::*;

pub struct AppState {
    pub config: Arc<Mutex<AppConfig>>,
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            db: Arc::new(db),
        }
    }

    pub(crate) fn config_snapshot(&self) -> Result<AppConfig, String> {
        let config = self.config.lock().map_err(|e| e.to_string())?;
        Ok(config.clone())
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let db = Database::open_in_memory().expect("in-memory database");
    crate::settings::activate(&db, "1.0.0").expect("activate");
    AppState::new(AppConfig::default(), db)
}
