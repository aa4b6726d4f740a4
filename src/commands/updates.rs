use crate::updater::{PluginInfo, UpdateInfo, Updater};
use super::AppState;

pub async fn check_for_update(state: &AppState) -> Result<Option<UpdateInfo>, String> {
    let settings = state.config_snapshot()?.updater;
    Ok(Updater::new(&state.db, settings).check_update().await)
}

pub async fn get_plugin_info(state: &AppState) -> Result<Option<PluginInfo>, String> {
    let settings = state.config_snapshot()?.updater;
    Ok(Updater::new(&state.db, settings).plugin_info().await)
}

pub fn clear_update_cache(state: &AppState) -> Result<(), String> {
    let settings = state.config_snapshot()?.updater;
    Updater::new(&state.db, settings)
        .clear_cache()
        .map(|_| ())
        .map_err(|e| e.to_string())
}
