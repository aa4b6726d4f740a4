use crate::recipients::{self, FormRecipients, RecipientList, UniqueRecipient};
use super::AppState;

pub fn get_recipients(state: &AppState) -> Result<Vec<String>, String> {
    RecipientList::new(&state.db).list().map_err(|e| e.to_string())
}

/// Returns the updated list.
pub fn add_recipient(state: &AppState, email: String) -> Result<Vec<String>, String> {
    if email.trim().is_empty() {
        return Err("Email address is required.".to_string());
    }
    let list = RecipientList::new(&state.db);
    list.add(&email).map_err(|e| e.to_string())?;
    list.list().map_err(|e| e.to_string())
}

pub fn remove_recipient(state: &AppState, email: String) -> Result<Vec<String>, String> {
    let list = RecipientList::new(&state.db);
    if !list.remove(email.trim()).map_err(|e| e.to_string())? {
        return Err("Failed to remove recipient.".to_string());
    }
    list.list().map_err(|e| e.to_string())
}

pub fn scan_form_recipients(state: &AppState) -> Result<Vec<FormRecipients>, String> {
    recipients::scan_form_recipients(&*state.db).map_err(|e| e.to_string())
}

pub fn get_all_unique_recipients(state: &AppState) -> Result<Vec<UniqueRecipient>, String> {
    recipients::all_unique_recipients(&*state.db).map_err(|e| e.to_string())
}

pub fn remove_form_recipient(state: &AppState, form_id: u64, email: String) -> Result<(), String> {
    if form_id == 0 || email.trim().is_empty() {
        return Err("Form ID and email are required.".to_string());
    }
    recipients::remove_form_recipient(&*state.db, form_id, email.trim()).map_err(|e| e.to_string())
}
