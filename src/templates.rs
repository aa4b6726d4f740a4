//! Email templates, at most one of which is active at a time.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{Database, OptionName};
use crate::error::{FormSettingsError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    /// Extra mail headers, newline separated
    #[serde(default)]
    pub additional_headers: String,
    #[serde(default)]
    pub active: bool,
    pub created: String,
    pub modified: String,
}

/// A template as submitted for saving. `id: None` creates a new template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub additional_headers: String,
    #[serde(default)]
    pub active: bool,
}

fn now() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub struct TemplateStore<'a> {
    db: &'a Database,
}

impl<'a> TemplateStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list(&self) -> Result<Vec<Template>> {
        Ok(self.db.load_document(OptionName::EmailTemplates)?)
    }

    pub fn get(&self, id: &str) -> Result<Option<Template>> {
        Ok(self.list()?.into_iter().find(|t| t.id == id))
    }

    pub fn get_active(&self) -> Result<Option<Template>> {
        Ok(self.list()?.into_iter().find(|t| t.active))
    }

    /// Create or update a template.
    ///
    /// Saving an active template deactivates every other one. An update keeps
    /// the original creation time; an unknown id is appended as a new record.
    pub fn save(&self, draft: TemplateDraft) -> Result<Template> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(FormSettingsError::MissingTemplateName);
        }

        let mut templates = self.list()?;
        let stamp = now();
        let id = draft
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("template_{}", Uuid::new_v4().simple()));

        if draft.active {
            for template in templates.iter_mut() {
                template.active = false;
            }
        }

        let existing = templates.iter().position(|t| t.id == id);
        let template = Template {
            created: existing
                .map(|pos| templates[pos].created.clone())
                .unwrap_or_else(|| stamp.clone()),
            id,
            name: name.to_string(),
            subject: draft.subject,
            body: draft.body,
            additional_headers: draft.additional_headers,
            active: draft.active,
            modified: stamp,
        };

        match existing {
            Some(pos) => templates[pos] = template.clone(),
            None => templates.push(template.clone()),
        }

        self.db.save_document(OptionName::EmailTemplates, &templates)?;
        log::info!("Saved email template {} ({})", template.name, template.id);
        Ok(template)
    }

    /// Returns false when no template has this id. Deleting the active
    /// template leaves none active.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut templates = self.list()?;
        let Some(pos) = templates.iter().position(|t| t.id == id) else {
            return Ok(false);
        };

        templates.remove(pos);
        self.db.save_document(OptionName::EmailTemplates, &templates)?;
        log::info!("Deleted email template {}", id);
        Ok(true)
    }

    /// Make `id` the only active template. An unknown id changes nothing.
    pub fn activate(&self, id: &str) -> Result<bool> {
        let mut templates = self.list()?;
        if !templates.iter().any(|t| t.id == id) {
            return Ok(false);
        }

        for template in templates.iter_mut() {
            template.active = template.id == id;
        }
        self.db.save_document(OptionName::EmailTemplates, &templates)?;
        log::info!("Activated email template {}", id);
        Ok(true)
    }
}

/// Mail tags offered as help text next to the template editor.
pub fn available_mail_tags() -> &'static [(&'static str, &'static str)] {
    &[
        ("[your-name]", "Sender name"),
        ("[your-email]", "Sender email"),
        ("[your-subject]", "Email subject"),
        ("[your-message]", "Message content"),
        ("[your-phone]", "Phone number"),
        ("[_site_title]", "Site title"),
        ("[_site_url]", "Site URL"),
        ("[_site_admin_email]", "Admin email"),
        ("[_date]", "Submission date"),
        ("[_time]", "Submission time"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, active: bool) -> TemplateDraft {
        TemplateDraft {
            name: name.to_string(),
            subject: format!("{} subject", name),
            body: format!("{} body", name),
            active,
            ..Default::default()
        }
    }

    #[test]
    fn test_save_new_then_get() {
        let db = Database::open_in_memory().unwrap();
        let store = TemplateStore::new(&db);
        let input = draft("Welcome", false);

        let saved = store.save(input.clone()).unwrap();
        assert!(saved.id.starts_with("template_"));
        assert_eq!(saved.created, saved.modified);

        let fetched = store.get(&saved.id).unwrap().unwrap();
        assert_eq!(fetched, saved);
        assert_eq!(fetched.name, input.name);
        assert_eq!(fetched.subject, input.subject);
        assert_eq!(fetched.body, input.body);
        assert_eq!(fetched.active, input.active);
    }

    #[test]
    fn test_name_required() {
        let db = Database::open_in_memory().unwrap();
        let store = TemplateStore::new(&db);
        let err = store.save(draft("   ", true)).unwrap_err();
        assert!(matches!(err, FormSettingsError::MissingTemplateName));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_single_active_on_save() {
        let db = Database::open_in_memory().unwrap();
        let store = TemplateStore::new(&db);
        let first = store.save(draft("First", true)).unwrap();
        let second = store.save(draft("Second", true)).unwrap();

        assert_eq!(store.get_active().unwrap().unwrap().id, second.id);
        let active: Vec<_> = store.list().unwrap().into_iter().filter(|t| t.active).collect();
        assert_eq!(active.len(), 1);
        assert!(!store.get(&first.id).unwrap().unwrap().active);
    }

    #[test]
    fn test_inactive_save_keeps_existing_active() {
        let db = Database::open_in_memory().unwrap();
        let store = TemplateStore::new(&db);
        let first = store.save(draft("First", true)).unwrap();
        store.save(draft("Second", false)).unwrap();
        assert_eq!(store.get_active().unwrap().unwrap().id, first.id);
    }

    #[test]
    fn test_update_in_place() {
        let db = Database::open_in_memory().unwrap();
        let store = TemplateStore::new(&db);
        let saved = store.save(draft("First", false)).unwrap();
        store.save(draft("Other", false)).unwrap();

        let mut edit = draft("Renamed", false);
        edit.id = Some(saved.id.clone());
        let updated = store.save(edit).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, saved.id);
        assert_eq!(all[0].name, "Renamed");
        assert_eq!(updated.created, saved.created);
    }

    #[test]
    fn test_activate() {
        let db = Database::open_in_memory().unwrap();
        let store = TemplateStore::new(&db);
        let first = store.save(draft("First", true)).unwrap();
        let second = store.save(draft("Second", false)).unwrap();

        assert!(store.activate(&second.id).unwrap());
        assert_eq!(store.get_active().unwrap().unwrap().id, second.id);
        assert!(!store.get(&first.id).unwrap().unwrap().active);
    }

    #[test]
    fn test_activate_unknown_id_changes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let store = TemplateStore::new(&db);
        let first = store.save(draft("First", true)).unwrap();

        assert!(!store.activate("template_missing").unwrap());
        assert_eq!(store.get_active().unwrap().unwrap().id, first.id);
    }

    #[test]
    fn test_delete_active_leaves_none_active() {
        let db = Database::open_in_memory().unwrap();
        let store = TemplateStore::new(&db);
        let first = store.save(draft("First", true)).unwrap();
        store.save(draft("Second", false)).unwrap();

        assert!(store.delete(&first.id).unwrap());
        assert!(!store.delete(&first.id).unwrap());
        assert!(store.get_active().unwrap().is_none());
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
