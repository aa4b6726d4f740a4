use thiserror::Error;

/// Every failure the stores and scanners can report.
#[derive(Error, Debug)]
pub enum FormSettingsError {
    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Email address already exists.")]
    DuplicateEmail,

    #[error("Template name is required.")]
    MissingTemplateName,

    #[error("Invalid form ID: {0}")]
    InvalidForm(u64),

    #[error("Form {0} has no recipients configured.")]
    NoRecipients(u64),

    #[error("Recipient not found in this form.")]
    RecipientNotFound,

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache lifetime of {0} is out of range.")]
    ExpiryOutOfRange(chrono::Duration),
}

pub type Result<T> = std::result::Result<T, FormSettingsError>;
