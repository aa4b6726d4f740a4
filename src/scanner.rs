//! Form-field scanner.
//!
//! Form markup describes each input with a tag such as `[text* your-name]`:
//!   `text`        — field type
//!   `*`           — required marker (optional)
//!   `your-name`   — field name
//!   anything else up to `]` is kept verbatim as the attribute string
//!
//! Buttons and consent boxes (`submit`, `acceptance`) are not input fields
//! and are skipped.

use std::collections::HashMap;

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::inventory::{FormInventory, FormRef};

lazy_static! {
    static ref FORM_TAG: Regex =
        Regex::new(r"\[([a-zA-Z0-9_-]+)(\*?)\s+([a-zA-Z0-9_-]+)([^\]]*)\]").unwrap();
}

const NON_INPUT_TYPES: &[&str] = &["submit", "acceptance"];

/// Reported as the type of a field whose forms disagree on its type.
pub const MIXED_TYPE: &str = "mixed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormTag {
    #[serde(rename = "type")]
    pub tag_type: String,
    pub name: String,
    pub required: bool,
    pub attributes: String,
}

/// One field name aggregated across every form that uses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    /// Taken from the first form the field was seen in
    pub required: bool,
    pub forms: Vec<FormRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStatistics {
    pub total_forms: usize,
    pub total_unique_fields: usize,
    pub last_scan: String,
}

/// Extract every input tag from form markup, in document order.
pub fn extract_fields(content: &str) -> Vec<FormTag> {
    FORM_TAG
        .captures_iter(content)
        .filter(|caps| !NON_INPUT_TYPES.contains(&&caps[1]))
        .map(|caps| FormTag {
            tag_type: caps[1].to_string(),
            required: !caps[2].is_empty(),
            name: caps[3].to_string(),
            attributes: caps
                .get(4)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
        })
        .collect()
}

/// Scan all published forms and aggregate their fields by name, in
/// first-seen order.
pub fn scan_all_forms(inventory: &dyn FormInventory) -> Result<Vec<ScannedField>> {
    let forms = inventory.published_forms()?;
    let mut fields: Vec<ScannedField> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for form in &forms {
        for tag in extract_fields(&form.content) {
            let pos = *index.entry(tag.name.clone()).or_insert_with(|| {
                fields.push(ScannedField {
                    name: tag.name.clone(),
                    field_type: tag.tag_type.clone(),
                    required: tag.required,
                    forms: Vec::new(),
                });
                fields.len() - 1
            });

            let field = &mut fields[pos];
            field.forms.push(FormRef::from(form));
            if field.field_type != tag.tag_type {
                field.field_type = MIXED_TYPE.to_string();
            }
        }
    }

    log::debug!("Scanned {} forms, found {} unique fields", forms.len(), fields.len());
    Ok(fields)
}

pub fn scan_statistics(inventory: &dyn FormInventory) -> Result<ScanStatistics> {
    let total_forms = inventory.published_forms()?.len();
    let fields = scan_all_forms(inventory)?;
    Ok(ScanStatistics {
        total_forms,
        total_unique_fields: fields.len(),
        last_scan: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, FormRecord};

    fn add_form(db: &Database, id: u64, content: &str) {
        db.upsert_form(&FormRecord {
            id,
            title: format!("Form {}", id),
            content: content.to_string(),
            mail_recipient: None,
            status: "publish".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn test_extract_fields() {
        let fields = extract_fields(r#"[text* your-name][email your-email][submit "Send"]"#);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].tag_type, "text");
        assert_eq!(fields[0].name, "your-name");
        assert!(fields[0].required);
        assert_eq!(fields[1].tag_type, "email");
        assert_eq!(fields[1].name, "your-email");
        assert!(!fields[1].required);
    }

    #[test]
    fn test_extract_attributes_and_skips() {
        let content = r#"
            <label>Phone [tel* your-phone class:phone placeholder "555"]</label>
            [acceptance terms-ok] I agree [/acceptance]
            [submit send-button]
        "#;
        let fields = extract_fields(content);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "your-phone");
        assert_eq!(fields[0].attributes, r#"class:phone placeholder "555""#);
    }

    #[test]
    fn test_aggregate_across_forms() {
        let db = Database::open_in_memory().unwrap();
        add_form(&db, 1, "[text* your-name][email* your-email]");
        add_form(&db, 2, "[text your-name][text your-email][tel phone]");

        let fields = scan_all_forms(&db).unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["your-name", "your-email", "phone"]);

        assert_eq!(fields[0].field_type, "text");
        assert!(fields[0].required);
        assert_eq!(fields[0].forms.len(), 2);

        assert_eq!(fields[1].field_type, MIXED_TYPE);
        assert_eq!(fields[2].forms, vec![FormRef { id: 2, title: "Form 2".to_string() }]);
    }

    #[test]
    fn test_scan_statistics() {
        let db = Database::open_in_memory().unwrap();
        add_form(&db, 1, "[text* your-name]");
        add_form(&db, 2, "no tags here");

        let stats = scan_statistics(&db).unwrap();
        assert_eq!(stats.total_forms, 2);
        assert_eq!(stats.total_unique_fields, 1);
    }
}
