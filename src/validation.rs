//! Per-field validation rules applied on top of the form plugin's own checks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db::{Database, OptionName};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub max_length: Option<u32>,
}

impl ValidationRule {
    /// A zero length bound means "no bound".
    pub fn normalized(self) -> Self {
        Self {
            required: self.required,
            min_length: self.min_length.filter(|&n| n > 0),
            max_length: self.max_length.filter(|&n| n > 0),
        }
    }
}

pub type RuleTable = BTreeMap<String, ValidationRule>;

/// How a field's length is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Length in characters.
    Generic,
    /// Length in digits, ignoring every non-numeric character.
    Phone,
}

impl FieldKind {
    /// Classify a form-tag type such as `tel*` or `text`.
    pub fn from_tag_type(tag_type: &str) -> Self {
        match tag_type.trim_end_matches('*') {
            "tel" => FieldKind::Phone,
            _ => FieldKind::Generic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Required,
    TooShort,
    TooLong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    fn new(kind: ViolationKind, message: String) -> Self {
        Self { kind, message }
    }
}

/// Evaluate one rule against one submitted value.
pub fn check_rule(rule: &ValidationRule, raw_value: &str, kind: FieldKind) -> Vec<Violation> {
    let value = raw_value.trim();
    let mut violations = Vec::new();

    if value.is_empty() {
        if rule.required {
            violations.push(Violation::new(
                ViolationKind::Required,
                "This field is required.".to_string(),
            ));
        }
        return violations;
    }

    let length = match kind {
        FieldKind::Generic => value.chars().count(),
        FieldKind::Phone => value.chars().filter(|c| c.is_ascii_digit()).count(),
    };

    if let Some(min) = rule.min_length {
        if length < min as usize {
            let message = match kind {
                FieldKind::Generic => format!("This field must be at least {} characters long.", min),
                FieldKind::Phone => format!("Phone number must be at least {} digits.", min),
            };
            violations.push(Violation::new(ViolationKind::TooShort, message));
        }
    }

    if let Some(max) = rule.max_length {
        if length > max as usize {
            let message = match kind {
                FieldKind::Generic => format!("This field must not exceed {} characters.", max),
                FieldKind::Phone => format!("Phone number must not exceed {} digits.", max),
            };
            violations.push(Violation::new(ViolationKind::TooLong, message));
        }
    }

    violations
}

pub struct ValidationRules<'a> {
    db: &'a Database,
}

impl<'a> ValidationRules<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn get_rules(&self) -> Result<RuleTable> {
        Ok(self.db.load_document(OptionName::ValidationRules)?)
    }

    /// Replace the whole table. Blank field names are dropped.
    pub fn set_rules(&self, rules: RuleTable) -> Result<()> {
        let rules: RuleTable = rules
            .into_iter()
            .filter_map(|(name, rule)| {
                let name = name.trim().to_string();
                (!name.is_empty()).then(|| (name, rule.normalized()))
            })
            .collect();
        self.db.save_document(OptionName::ValidationRules, &rules)?;
        log::info!("Saved validation rules for {} fields", rules.len());
        Ok(())
    }

    pub fn get_field_rule(&self, field_name: &str) -> Result<Option<ValidationRule>> {
        Ok(self.get_rules()?.remove(field_name))
    }

    pub fn set_field_rule(&self, field_name: &str, rule: ValidationRule) -> Result<()> {
        let mut rules = self.get_rules()?;
        rules.insert(field_name.to_string(), rule.normalized());
        self.db.save_document(OptionName::ValidationRules, &rules)?;
        Ok(())
    }

    /// Returns false when the field had no rule.
    pub fn remove_field_rule(&self, field_name: &str) -> Result<bool> {
        let mut rules = self.get_rules()?;
        if rules.remove(field_name).is_none() {
            return Ok(false);
        }
        self.db.save_document(OptionName::ValidationRules, &rules)?;
        Ok(true)
    }

    /// Fields without a stored rule always pass.
    pub fn check(&self, field_name: &str, raw_value: &str, kind: FieldKind) -> Result<Vec<Violation>> {
        Ok(match self.get_field_rule(field_name)? {
            Some(rule) => check_rule(&rule, raw_value, kind),
            None => Vec::new(),
        })
    }
}
