use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the app data directory: %APPDATA%/form-settings/
pub fn app_data_dir() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("form-settings");
    fs::create_dir_all(&dir).ok();
    dir
}

pub fn config_path() -> PathBuf {
    app_data_dir().join("config.json")
}

// ── Data types ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub updater: UpdaterSettings,
    /// Theme root whose `assets/js` scripts are checked by the conflict scanner
    #[serde(default)]
    pub theme_dir: Option<PathBuf>,
    /// Overrides `<app_data_dir>/data.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| app_data_dir().join("data.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterSettings {
    /// GitHub account owning the release repository
    pub owner: String,
    pub repo: String,
    /// `<slug>/<main file>` identifier the host uses for this plugin
    pub plugin_basename: String,
    pub current_version: String,
    /// How long a fetched release stays cached
    #[serde(default = "default_cache_hours")]
    pub cache_hours: u32,
    /// Deadline for the releases API call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_cache_hours() -> u32 {
    12
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self {
            owner: "bsd".to_string(),
            repo: "form-settings".to_string(),
            plugin_basename: "form-settings/form-settings.php".to_string(),
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            cache_hours: default_cache_hours(),
            timeout_secs: default_timeout_secs(),
            api_base: default_api_base(),
        }
    }
}

// ── Load / Save ─────────────────────────────────────────────

/// Read a file to string, handling BOM (UTF-8 BOM and UTF-16 LE/BE).
pub fn read_file_strip_bom(path: &Path) -> Result<String, String> {
    let raw = fs::read(path).map_err(|e| format!("Failed to read file: {}", e))?;

    // UTF-16 LE BOM: FF FE
    if raw.len() >= 2 && raw[0] == 0xFF && raw[1] == 0xFE {
        let u16_iter = raw[2..].chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]]));
        return String::from_utf16(&u16_iter.collect::<Vec<u16>>())
            .map_err(|e| format!("Invalid UTF-16 LE: {}", e));
    }

    // UTF-16 BE BOM: FE FF
    if raw.len() >= 2 && raw[0] == 0xFE && raw[1] == 0xFF {
        let u16_iter = raw[2..].chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]]));
        return String::from_utf16(&u16_iter.collect::<Vec<u16>>())
            .map_err(|e| format!("Invalid UTF-16 BE: {}", e));
    }

    // UTF-8 BOM: EF BB BF
    let text = String::from_utf8(raw).map_err(|e| format!("Invalid UTF-8: {}", e))?;
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text).to_string();
    Ok(text)
}

pub fn load_config() -> AppConfig {
    let path = config_path();
    if path.exists() {
        let data = read_file_strip_bom(&path).unwrap_or_default();
        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                AppConfig::default()
            }
        }
    } else {
        let config = AppConfig::default();
        save_config(&config).ok();
        config
    }
}

pub fn save_config(config: &AppConfig) -> Result<(), String> {
    let path = config_path();
    let json = serde_json::to_string_pretty(config).map_err(|e| e.to_string())?;
    fs::write(&path, json).map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.updater.cache_hours, 12);
        assert_eq!(config.updater.api_base, "https://api.github.com");
        assert!(config.theme_dir.is_none());
    }

    #[test]
    fn test_log_cap_is_not_configurable() {
        let config: AppConfig =
            serde_json::from_str(r#"{"error_log": {"max_entries": 600}}"#).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("error_log").is_none());
    }

    #[test]
    fn test_strip_utf8_bom() {
        let path = std::env::temp_dir().join(format!("fs-bom-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, b"\xEF\xBB\xBF{\"theme_dir\":null}").unwrap();
        let text = read_file_strip_bom(&path).unwrap();
        assert_eq!(text, "{\"theme_dir\":null}");
        fs::remove_file(&path).ok();
    }
}
