pub mod commands;
pub mod config;
pub mod conflicts;
pub mod db;
pub mod error;
pub mod error_log;
pub mod frontend;
pub mod hooks;
pub mod inventory;
pub mod recipients;
pub mod scanner;
pub mod settings;
pub mod templates;
pub mod updater;
pub mod validation;

use commands::AppState;

/// Load configuration, open the store and seed first-install defaults.
pub fn init() -> Result<AppState, String> {
    let _ = env_logger::try_init();

    let app_config = config::load_config();
    let db_path = app_config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create data directory: {}", e))?;
    }

    let database = db::Database::new(&db_path)
        .map_err(|e| format!("Failed to initialize database: {}", e))?;
    settings::activate(&database, env!("CARGO_PKG_VERSION")).map_err(|e| e.to_string())?;

    log::info!("Form settings ready (database at {})", db_path.display());
    Ok(AppState::new(app_config, database))
}
