use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::{Database, OptionName};
use crate::error::Result;
use crate::templates::Template;
use crate::validation::RuleTable;

/// The general options document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginOptions {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub installed_date: String,
    /// Block copy, cut, paste and the context menu on form inputs
    #[serde(default)]
    pub disable_copy_paste: bool,
}

pub fn load_options(db: &Database) -> Result<PluginOptions> {
    Ok(db.load_document(OptionName::Settings)?)
}

/// Update the user-editable flags, keeping install metadata as stored.
pub fn save_settings(db: &Database, disable_copy_paste: bool) -> Result<PluginOptions> {
    let mut options = load_options(db)?;
    options.disable_copy_paste = disable_copy_paste;
    db.save_document(OptionName::Settings, &options)?;
    log::info!("Saved settings (disable_copy_paste = {})", disable_copy_paste);
    Ok(options)
}

/// Seed every document on first install. Existing documents are left alone.
pub fn activate(db: &Database, version: &str) -> Result<()> {
    db.add_document(OptionName::Recipients, &Vec::<String>::new())?;
    db.add_document(OptionName::ValidationRules, &RuleTable::new())?;
    db.add_document(OptionName::EmailTemplates, &Vec::<Template>::new())?;
    let created = db.add_document(
        OptionName::Settings,
        &PluginOptions {
            version: version.to_string(),
            installed_date: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            disable_copy_paste: false,
        },
    )?;
    if created {
        log::info!("Installed form settings {}", version);
    }
    Ok(())
}
