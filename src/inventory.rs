//! Read/write access to the form plugin's form inventory.
//!
//! The forms themselves belong to the form plugin; this crate only reads
//! their markup and mail recipients, and rewrites the recipient string when
//! an administrator removes an address from a form.

use crate::db::{Database, FormRecord};
use crate::error::Result;

/// A form reference as shown next to a recipient or a scanned field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FormRef {
    pub id: u64,
    pub title: String,
}

impl From<&FormRecord> for FormRef {
    fn from(form: &FormRecord) -> Self {
        Self {
            id: form.id,
            title: form.title.clone(),
        }
    }
}

pub trait FormInventory {
    /// All published forms, in a stable order.
    fn published_forms(&self) -> Result<Vec<FormRecord>>;

    fn form(&self, id: u64) -> Result<Option<FormRecord>>;

    /// Replace a form's mail recipient string. Returns false for an unknown form.
    fn set_mail_recipient(&self, id: u64, recipient: &str) -> Result<bool>;
}

impl FormInventory for Database {
    fn published_forms(&self) -> Result<Vec<FormRecord>> {
        Ok(self.get_published_forms()?)
    }

    fn form(&self, id: u64) -> Result<Option<FormRecord>> {
        Ok(self.get_form(id)?)
    }

    fn set_mail_recipient(&self, id: u64, recipient: &str) -> Result<bool> {
        Ok(self.set_form_recipient(id, recipient)?)
    }
}
