use crate::config::{self, AppConfig};
use crate::frontend;
use crate::settings::{self, PluginOptions};
use super::AppState;

pub fn get_config(state: &AppState) -> Result<AppConfig, String> {
    state.config_snapshot()
}

pub fn save_config_cmd(state: &AppState, new_config: AppConfig) -> Result<(), String> {
    config::save_config(&new_config)?;
    let mut current = state.config.lock().map_err(|e| e.to_string())?;
    *current = new_config;
    Ok(())
}

pub fn get_config_path() -> String {
    config::config_path().to_string_lossy().to_string()
}

pub fn get_settings(state: &AppState) -> Result<PluginOptions, String> {
    settings::load_options(&state.db).map_err(|e| e.to_string())
}

pub fn save_settings(state: &AppState, disable_copy_paste: bool) -> Result<PluginOptions, String> {
    settings::save_settings(&state.db, disable_copy_paste).map_err(|e| e.to_string())
}

/// Script to inline on public pages that render a form, if any.
pub fn get_frontend_script(state: &AppState) -> Result<Option<String>, String> {
    let options = settings::load_options(&state.db).map_err(|e| e.to_string())?;
    Ok(frontend::inline_script(&options).map(str::to_string))
}
