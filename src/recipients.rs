//! Global mail recipients, and the literal recipients configured on each form.

use validator::ValidateEmail;

use crate::db::{Database, OptionName};
use crate::error::{FormSettingsError, Result};
use crate::inventory::{FormInventory, FormRef};

pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.validate_email()
}

/// Split a comma-separated recipient string into trimmed entries.
fn split_recipients(recipients: &str) -> Vec<String> {
    recipients.split(',').map(|r| r.trim().to_string()).collect()
}

/// Union a form's own recipient string with the global list.
///
/// First occurrence wins, empty entries are dropped, and the result is
/// joined with `", "`. An empty global list leaves `existing` untouched.
pub fn merge_recipients(existing: &str, global: &[String]) -> String {
    if global.is_empty() {
        return existing.to_string();
    }

    let mut merged: Vec<String> = Vec::new();
    for email in split_recipients(existing).into_iter().chain(global.iter().cloned()) {
        if !email.is_empty() && !merged.contains(&email) {
            merged.push(email);
        }
    }
    merged.join(", ")
}

/// The ordered, duplicate-free list of addresses copied on every form mail.
pub struct RecipientList<'a> {
    db: &'a Database,
}

impl<'a> RecipientList<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.db.load_document(OptionName::Recipients)?)
    }

    pub fn add(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(FormSettingsError::InvalidEmail);
        }

        let mut recipients = self.list()?;
        if recipients.iter().any(|r| r == email) {
            return Err(FormSettingsError::DuplicateEmail);
        }

        recipients.push(email.to_string());
        self.db.save_document(OptionName::Recipients, &recipients)?;
        log::info!("Added global recipient {}", email);
        Ok(())
    }

    /// Returns false when the address is not in the list.
    pub fn remove(&self, email: &str) -> Result<bool> {
        let mut recipients = self.list()?;
        let Some(pos) = recipients.iter().position(|r| r == email) else {
            return Ok(false);
        };

        recipients.remove(pos);
        self.db.save_document(OptionName::Recipients, &recipients)?;
        log::info!("Removed global recipient {}", email);
        Ok(true)
    }
}

// ── Per-form recipients ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FormRecipients {
    pub form_id: u64,
    pub form_title: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UniqueRecipient {
    pub email: String,
    pub forms: Vec<FormRef>,
}

/// Literal email recipients of every published form. Mail tags such as
/// `[your-email]` and malformed addresses are skipped, and forms left with
/// no literal recipient are omitted.
pub fn scan_form_recipients(inventory: &dyn FormInventory) -> Result<Vec<FormRecipients>> {
    let mut found = Vec::new();

    for form in inventory.published_forms()? {
        let Some(recipient) = form.mail_recipient.as_deref().filter(|r| !r.is_empty()) else {
            continue;
        };

        let recipients: Vec<String> = split_recipients(recipient)
            .into_iter()
            .filter(|r| !r.contains('[') && is_valid_email(r))
            .collect();

        if !recipients.is_empty() {
            found.push(FormRecipients {
                form_id: form.id,
                form_title: form.title,
                recipients,
            });
        }
    }

    Ok(found)
}

/// Group the per-form recipients by address.
pub fn all_unique_recipients(inventory: &dyn FormInventory) -> Result<Vec<UniqueRecipient>> {
    let mut unique: Vec<UniqueRecipient> = Vec::new();

    for form in scan_form_recipients(inventory)? {
        for email in form.recipients {
            let form_ref = FormRef {
                id: form.form_id,
                title: form.form_title.clone(),
            };
            match unique.iter_mut().find(|u| u.email == email) {
                Some(existing) => existing.forms.push(form_ref),
                None => unique.push(UniqueRecipient {
                    email,
                    forms: vec![form_ref],
                }),
            }
        }
    }

    Ok(unique)
}

/// Remove one address from a form's own recipient string.
pub fn remove_form_recipient(
    inventory: &dyn FormInventory,
    form_id: u64,
    email: &str,
) -> Result<()> {
    let form = inventory
        .form(form_id)?
        .ok_or(FormSettingsError::InvalidForm(form_id))?;
    let recipient = form
        .mail_recipient
        .ok_or(FormSettingsError::NoRecipients(form_id))?;

    let mut recipients = split_recipients(&recipient);
    let pos = recipients
        .iter()
        .position(|r| r == email)
        .ok_or(FormSettingsError::RecipientNotFound)?;
    recipients.remove(pos);

    if !inventory.set_mail_recipient(form_id, &recipients.join(", "))? {
        return Err(FormSettingsError::InvalidForm(form_id));
    }
    log::info!("Removed {} from form {}", email, form_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::FormRecord;

    fn add_form(db: &Database, id: u64, recipient: Option<&str>) {
        db.upsert_form(&FormRecord {
            id,
            title: format!("Form {}", id),
            content: String::new(),
            mail_recipient: recipient.map(str::to_string),
            status: "publish".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn test_add_then_list() {
        let db = Database::open_in_memory().unwrap();
        let list = RecipientList::new(&db);
        list.add("sales@example.com").unwrap();
        list.add("ops@example.com").unwrap();
        assert_eq!(list.list().unwrap(), vec!["sales@example.com", "ops@example.com"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let db = Database::open_in_memory().unwrap();
        let list = RecipientList::new(&db);
        list.add("sales@example.com").unwrap();
        let err = list.add("sales@example.com").unwrap_err();
        assert!(matches!(err, FormSettingsError::DuplicateEmail));
        assert_eq!(list.list().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_check_is_case_sensitive() {
        let db = Database::open_in_memory().unwrap();
        let list = RecipientList::new(&db);
        list.add("sales@example.com").unwrap();
        list.add("Sales@example.com").unwrap();
        assert_eq!(list.list().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_email_rejected() {
        let db = Database::open_in_memory().unwrap();
        let list = RecipientList::new(&db);
        assert!(matches!(
            list.add("not-an-email").unwrap_err(),
            FormSettingsError::InvalidEmail
        ));
        assert!(matches!(list.add("").unwrap_err(), FormSettingsError::InvalidEmail));
        assert!(list.list().unwrap().is_empty());
    }

    #[test]
    fn test_remove() {
        let db = Database::open_in_memory().unwrap();
        let list = RecipientList::new(&db);
        list.add("a@example.com").unwrap();
        list.add("b@example.com").unwrap();
        list.add("c@example.com").unwrap();

        assert!(list.remove("b@example.com").unwrap());
        assert!(!list.remove("b@example.com").unwrap());
        assert_eq!(list.list().unwrap(), vec!["a@example.com", "c@example.com"]);
    }

    #[test]
    fn test_merge_recipients() {
        let global = vec!["ops@example.com".to_string(), "owner@example.com".to_string()];
        assert_eq!(
            merge_recipients(" owner@example.com , ,[your-email]", &global),
            "owner@example.com, [your-email], ops@example.com"
        );
        assert_eq!(merge_recipients("", &global), "ops@example.com, owner@example.com");
    }

    #[test]
    fn test_merge_without_globals_is_noop() {
        assert_eq!(merge_recipients("a@example.com ,b@example.com", &[]), "a@example.com ,b@example.com");
    }

    #[test]
    fn test_scan_form_recipients_skips_tags_and_invalid() {
        let db = Database::open_in_memory().unwrap();
        add_form(&db, 1, Some("[your-email], admin@example.com, nonsense"));
        add_form(&db, 2, Some("[_site_admin_email]"));
        add_form(&db, 3, None);

        let scanned = scan_form_recipients(&db).unwrap();
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].form_id, 1);
        assert_eq!(scanned[0].recipients, vec!["admin@example.com"]);
    }

    #[test]
    fn test_unique_recipients_group_forms() {
        let db = Database::open_in_memory().unwrap();
        add_form(&db, 1, Some("admin@example.com"));
        add_form(&db, 2, Some("admin@example.com, sales@example.com"));

        let unique = all_unique_recipients(&db).unwrap();
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].email, "admin@example.com");
        let ids: Vec<u64> = unique[0].forms.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(unique[1].forms.len(), 1);
    }

    #[test]
    fn test_remove_form_recipient() {
        let db = Database::open_in_memory().unwrap();
        add_form(&db, 1, Some("a@example.com,b@example.com , c@example.com"));

        remove_form_recipient(&db, 1, "b@example.com").unwrap();
        assert_eq!(
            db.get_form(1).unwrap().unwrap().mail_recipient.as_deref(),
            Some("a@example.com, c@example.com")
        );
    }

    #[test]
    fn test_remove_form_recipient_failures() {
        let db = Database::open_in_memory().unwrap();
        add_form(&db, 1, Some("a@example.com"));
        add_form(&db, 2, None);

        assert!(matches!(
            remove_form_recipient(&db, 99, "a@example.com").unwrap_err(),
            FormSettingsError::InvalidForm(99)
        ));
        assert!(matches!(
            remove_form_recipient(&db, 2, "a@example.com").unwrap_err(),
            FormSettingsError::NoRecipients(2)
        ));
        assert!(matches!(
            remove_form_recipient(&db, 1, "z@example.com").unwrap_err(),
            FormSettingsError::RecipientNotFound
        ));
    }
}
