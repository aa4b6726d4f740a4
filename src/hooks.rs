//! Typed entry points the form plugin calls while processing a submission.
//!
//! Mail composition runs the recipient merge first and the active template
//! second. Every handler is infallible from the caller's point of view:
//! storage failures are logged and the submission proceeds untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::Database;
use crate::error_log::{ErrorLog, LogType, NewLogEntry, RequestContext};
use crate::inventory::FormRef;
use crate::recipients::{merge_recipients, RecipientList};
use crate::scanner::FormTag;
use crate::templates::{Template, TemplateStore};
use crate::validation::{FieldKind, ValidationRules, Violation};

/// The outbound notification mail, as assembled just before sending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailComponents {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub additional_headers: String,
}

/// Overwrite subject/body with the template's non-empty values and append
/// its headers.
pub fn apply_template(mut components: MailComponents, template: &Template) -> MailComponents {
    if !template.subject.is_empty() {
        components.subject = template.subject.clone();
    }
    if !template.body.is_empty() {
        components.body = template.body.clone();
    }
    if !template.additional_headers.is_empty() {
        components.additional_headers = format!(
            "{}\n{}",
            components.additional_headers, template.additional_headers
        );
    }
    components
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    MailSent,
    MailFailed,
    ValidationFailed,
    AcceptanceMissing,
    Spam,
    Aborted,
    Invalid,
}

impl SubmissionStatus {
    /// Statuses recorded as validation errors. Spam and mail failures have
    /// their own events.
    pub fn is_validation_failure(self) -> bool {
        matches!(
            self,
            SubmissionStatus::ValidationFailed
                | SubmissionStatus::AcceptanceMissing
                | SubmissionStatus::Invalid
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidField {
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub status: SubmissionStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub invalid_fields: Vec<InvalidField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostedValue {
    Single(String),
    Multiple(Vec<String>),
}

pub type PostedData = BTreeMap<String, PostedValue>;

const SENSITIVE_FIELD_MARKERS: &[&str] = &["password", "card"];

/// Flatten posted values for the log, leaving out any field whose name looks
/// like a password or card number.
pub fn redact_submission(posted: &PostedData) -> BTreeMap<String, String> {
    posted
        .iter()
        .filter(|(name, _)| {
            let name = name.to_lowercase();
            !SENSITIVE_FIELD_MARKERS.iter().any(|m| name.contains(m))
        })
        .map(|(name, value)| {
            let flat = match value {
                PostedValue::Single(v) => v.clone(),
                PostedValue::Multiple(vs) => vs.join(", "),
            };
            (name.clone(), flat)
        })
        .collect()
}

pub struct FormHooks<'a> {
    db: &'a Database,
}

impl<'a> FormHooks<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn on_mail_compose(&self, components: MailComponents) -> MailComponents {
        let mut components = components;

        match RecipientList::new(self.db).list() {
            Ok(global) => components.recipient = merge_recipients(&components.recipient, &global),
            Err(e) => log::error!("Failed to load global recipients: {}", e),
        }

        match TemplateStore::new(self.db).get_active() {
            Ok(Some(template)) => components = apply_template(components, &template),
            Ok(None) => {}
            Err(e) => log::error!("Failed to load active email template: {}", e),
        }

        components
    }

    pub fn on_validate_field(&self, tag: &FormTag, posted_value: &str) -> Vec<Violation> {
        let kind = FieldKind::from_tag_type(&tag.tag_type);
        match ValidationRules::new(self.db).check(&tag.name, posted_value, kind) {
            Ok(violations) => violations,
            Err(e) => {
                log::error!("Failed to load validation rule for {}: {}", tag.name, e);
                Vec::new()
            }
        }
    }

    pub fn on_submission_result(
        &self,
        form: &FormRef,
        result: &SubmissionResult,
        posted: &PostedData,
        request: &RequestContext,
    ) {
        if !result.status.is_validation_failure() {
            return;
        }

        let details = json!({
            "invalid_fields": result.invalid_fields,
            "submission_data": redact_submission(posted),
            "result_status": result.status,
        });
        let message = result
            .message
            .clone()
            .unwrap_or_else(|| "Form validation failed".to_string());
        self.record(LogType::Validation, form, message, details, request);
    }

    pub fn on_spam_flagged(&self, form: &FormRef, posted: &PostedData, request: &RequestContext) {
        let details = json!(redact_submission(posted));
        self.record(
            LogType::Spam,
            form,
            "Form submission marked as spam".to_string(),
            details,
            request,
        );
    }

    pub fn on_mail_failed(&self, form: &FormRef, posted: &PostedData, request: &RequestContext) {
        let details = json!(redact_submission(posted));
        self.record(
            LogType::Mail,
            form,
            "Failed to send email".to_string(),
            details,
            request,
        );
    }

    fn record(
        &self,
        log_type: LogType,
        form: &FormRef,
        message: String,
        details: serde_json::Value,
        request: &RequestContext,
    ) {
        let entry = NewLogEntry {
            log_type,
            form_id: form.id,
            form_title: form.title.clone(),
            message,
            details,
        };
        if let Err(e) = ErrorLog::new(self.db).append(entry, request) {
            log::error!("Failed to record {:?} error for form {}: {}", log_type, form.id, e);
        }
    }
}
