use serde::Serialize;

use crate::templates::{self, Template, TemplateDraft, TemplateStore};
use super::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct MailTag {
    pub tag: String,
    pub description: String,
}

pub fn get_templates(state: &AppState) -> Result<Vec<Template>, String> {
    TemplateStore::new(&state.db).list().map_err(|e| e.to_string())
}

pub fn get_template(state: &AppState, id: String) -> Result<Option<Template>, String> {
    TemplateStore::new(&state.db).get(&id).map_err(|e| e.to_string())
}

pub fn save_template(state: &AppState, draft: TemplateDraft) -> Result<Template, String> {
    TemplateStore::new(&state.db).save(draft).map_err(|e| e.to_string())
}

pub fn delete_template(state: &AppState, id: String) -> Result<(), String> {
    match TemplateStore::new(&state.db).delete(&id) {
        Ok(true) => Ok(()),
        Ok(false) => Err("Failed to delete template.".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

pub fn activate_template(state: &AppState, id: String) -> Result<(), String> {
    match TemplateStore::new(&state.db).activate(&id) {
        Ok(true) => Ok(()),
        Ok(false) => Err("Failed to activate template.".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

pub fn get_mail_tags() -> Vec<MailTag> {
    templates::available_mail_tags()
        .iter()
        .map(|(tag, description)| MailTag {
            tag: tag.to_string(),
            description: description.to_string(),
        })
        .collect()
}
