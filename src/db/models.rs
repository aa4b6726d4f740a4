/// One contact form as mirrored from the form plugin's inventory.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FormRecord {
    pub id: u64,
    pub title: String,
    /// Raw form markup containing `[type name ...]` tags
    pub content: String,
    /// Comma-separated mail recipient string, may contain mail tags
    pub mail_recipient: Option<String>,
    pub status: String,
}

impl FormRecord {
    pub fn is_published(&self) -> bool {
        self.status == "publish"
    }
}
