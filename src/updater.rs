//! Checks the GitHub releases API for a newer plugin version.
//!
//! Releases are cached in a transient so admin page loads do not hit the
//! network. Any failure along the way means "no update available".

use std::cmp::Ordering;
use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::config::UpdaterSettings;
use crate::db::Database;
use crate::error::Result;

const TESTED_UP_TO: &str = "6.4";
const REQUIRES: &str = "5.0";
const REQUIRES_PHP: &str = "7.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub html_url: String,
    pub zipball_url: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl Release {
    /// Tag with any leading `v` removed.
    pub fn version(&self) -> &str {
        self.tag_name.trim_start_matches('v')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateInfo {
    pub slug: String,
    pub new_version: String,
    pub url: String,
    pub package: String,
    pub tested: String,
    pub requires_php: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub slug: String,
    pub version: String,
    pub author: String,
    pub homepage: String,
    pub requires: String,
    pub tested: String,
    pub requires_php: String,
    pub download_link: String,
    pub description: String,
    pub changelog: String,
}

/// Compare dotted version strings numerically; missing parts count as 0.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    fn parts(v: &str) -> Vec<u64> {
        v.trim()
            .trim_start_matches('v')
            .split(['.', '-', '+'])
            .map(|part| {
                let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    }

    let (a, b) = (parts(a), parts(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let ord = a.get(i).copied().unwrap_or(0).cmp(&b.get(i).copied().unwrap_or(0));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

pub struct Updater<'a> {
    db: &'a Database,
    settings: UpdaterSettings,
}

impl<'a> Updater<'a> {
    pub fn new(db: &'a Database, settings: UpdaterSettings) -> Self {
        Self { db, settings }
    }

    fn cache_key(&self) -> String {
        format!("form_settings_update_{}", self.settings.repo)
    }

    /// Directory part of the plugin basename.
    pub fn slug(&self) -> &str {
        self.settings
            .plugin_basename
            .split('/')
            .next()
            .unwrap_or(&self.settings.plugin_basename)
    }

    fn cached_release(&self) -> Option<Release> {
        match self.db.get_transient(&self.cache_key()) {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to read update cache: {}", e);
                None
            }
        }
    }

    async fn fetch_release(&self) -> std::result::Result<Release, reqwest::Error> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.owner,
            self.settings.repo
        );

        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.settings.timeout_secs))
            .build()?
            .get(&url)
            .header(ACCEPT, "application/vnd.github.v3+json")
            .header(USER_AGENT, format!("form-settings/{}", self.settings.current_version))
            .send()
            .await?
            .error_for_status()?
            .json::<Release>()
            .await
    }

    /// Latest release, from cache when fresh.
    pub async fn release_info(&self) -> Option<Release> {
        if let Some(release) = self.cached_release() {
            return Some(release);
        }

        let release = match self.fetch_release().await {
            Ok(release) => release,
            Err(e) => {
                log::warn!("Update check failed: {}", e);
                return None;
            }
        };

        self.store_release(&release);
        Some(release)
    }

    /// Cache a fetched release. Failures only cost a refetch.
    fn store_release(&self, release: &Release) {
        let ttl = chrono::Duration::hours(self.settings.cache_hours as i64);
        match serde_json::to_string(release) {
            Ok(raw) => {
                if let Err(e) = self.db.set_transient(&self.cache_key(), &raw, ttl) {
                    log::warn!("Failed to cache release info: {}", e);
                }
            }
            Err(e) => log::warn!("Failed to encode release info: {}", e),
        }
    }

    /// Describes the newer release, or None when up to date or unreachable.
    pub async fn check_update(&self) -> Option<UpdateInfo> {
        let release = self.release_info().await?;
        let new_version = release.version().to_string();

        if compare_versions(&self.settings.current_version, &new_version) != Ordering::Less {
            return None;
        }

        log::info!(
            "Update available: {} -> {}",
            self.settings.current_version,
            new_version
        );
        Some(UpdateInfo {
            slug: self.slug().to_string(),
            new_version,
            url: release.html_url,
            package: release.zipball_url,
            tested: TESTED_UP_TO.to_string(),
            requires_php: REQUIRES_PHP.to_string(),
        })
    }

    pub async fn plugin_info(&self) -> Option<PluginInfo> {
        let release = self.release_info().await?;
        let changelog = release
            .body
            .clone()
            .filter(|body| !body.trim().is_empty())
            .unwrap_or_else(|| "No changelog available.".to_string());

        Some(PluginInfo {
            name: "Form Settings".to_string(),
            slug: self.slug().to_string(),
            version: release.version().to_string(),
            author: format!("https://github.com/{}", self.settings.owner),
            homepage: release.html_url.clone(),
            requires: REQUIRES.to_string(),
            tested: TESTED_UP_TO.to_string(),
            requires_php: REQUIRES_PHP.to_string(),
            download_link: release.zipball_url,
            description: "Manages contact form recipients, validation rules, email templates, and error logging."
                .to_string(),
            changelog,
        })
    }

    pub fn clear_cache(&self) -> Result<bool> {
        Ok(self.db.delete_transient(&self.cache_key())?)
    }
}
