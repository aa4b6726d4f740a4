//! Detects theme scripts likely to interfere with form validation.

use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::config::read_file_strip_bom;
use crate::error::Result;

lazy_static! {
    static ref INVALID_BIND: Regex = Regex::new(r#"(?i)bind\s*\(\s*['"]invalid['"]\s*,"#).unwrap();
    static ref SUBMIT_PREVENT_DEFAULT: Regex =
        Regex::new(r"(?is)\.submit\s*\(\s*function.*preventDefault").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub file: String,
    pub issue: String,
    pub description: String,
    pub recommendation: String,
    pub severity: Severity,
}

/// Check one script's name and source.
pub fn scan_script(file_name: &str, content: &str) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    if content.to_lowercase().contains("jquery.validate")
        || file_name.to_lowercase().contains("validate")
    {
        conflicts.push(Conflict {
            conflict_type: ConflictType::Warning,
            file: file_name.to_string(),
            issue: "jQuery Validate library detected".to_string(),
            description: "This library may conflict with form validation.".to_string(),
            recommendation: "Consider removing jQuery Validate or excluding contact forms from validation."
                .to_string(),
            severity: Severity::Medium,
        });
    }

    if INVALID_BIND.is_match(content) {
        conflicts.push(Conflict {
            conflict_type: ConflictType::Error,
            file: file_name.to_string(),
            issue: "preventDefault on invalid event".to_string(),
            description: "Code is blocking browser validation with bind('invalid', function() { return false; })"
                .to_string(),
            recommendation: "Remove lines that use .bind('invalid', function() { return false; })"
                .to_string(),
            severity: Severity::High,
        });
    }

    if SUBMIT_PREVENT_DEFAULT.is_match(content) {
        conflicts.push(Conflict {
            conflict_type: ConflictType::Warning,
            file: file_name.to_string(),
            issue: "Form submit preventDefault detected".to_string(),
            description: "Custom form submission handling may interfere with contact forms.".to_string(),
            recommendation: "Ensure contact forms (class .wpcf7-form) are excluded from custom submit handlers."
                .to_string(),
            severity: Severity::Medium,
        });
    }

    conflicts
}

/// Flag registered script handles that look like validation libraries.
pub fn scan_registered_handles(handles: &[&str]) -> Vec<Conflict> {
    handles
        .iter()
        .filter(|handle| {
            let lower = handle.to_lowercase();
            lower.contains("validate") || lower.contains("validator")
        })
        .map(|handle| Conflict {
            conflict_type: ConflictType::Info,
            file: "Enqueued Script".to_string(),
            issue: format!("Validation script: {}", handle),
            description: "A validation library is enqueued.".to_string(),
            recommendation: "Verify it doesn't conflict with contact forms.".to_string(),
            severity: Severity::Low,
        })
        .collect()
}

fn theme_scripts(theme_dir: &Path) -> Result<Vec<PathBuf>> {
    let js_dir = theme_dir.join("assets").join("js");
    if !js_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut scripts = Vec::new();
    for entry in fs::read_dir(&js_dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "js") {
            scripts.push(path);
        }
    }
    scripts.sort();
    Ok(scripts)
}

/// Scan `<theme_dir>/assets/js/*.js`. Unreadable files are skipped.
pub fn scan_theme(theme_dir: &Path) -> Result<Vec<Conflict>> {
    let mut conflicts = Vec::new();

    for path in theme_scripts(theme_dir)? {
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        match read_file_strip_bom(&path) {
            Ok(content) => conflicts.extend(scan_script(&file_name, &content)),
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    Ok(conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_script() {
        assert!(scan_script("main.js", "console.log('hi');").is_empty());
    }

    #[test]
    fn test_detects_each_pattern() {
        let validate = scan_script("jquery.validate.min.js", "");
        assert_eq!(validate.len(), 1);
        assert_eq!(validate[0].severity, Severity::Medium);

        let bind = scan_script("app.js", "$('input').bind( \"invalid\", function() { return false; });");
        assert_eq!(bind.len(), 1);
        assert_eq!(bind[0].conflict_type, ConflictType::Error);
        assert_eq!(bind[0].severity, Severity::High);

        let submit = scan_script("app.js", "$('form').submit(function(e) {\n  e.preventDefault();\n});");
        assert_eq!(submit.len(), 1);
        assert_eq!(submit[0].issue, "Form submit preventDefault detected");
    }

    #[test]
    fn test_registered_handles() {
        let conflicts = scan_registered_handles(&["jquery", "jquery-Validator", "form-validate"]);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].issue, "Validation script: jquery-Validator");
        assert_eq!(conflicts[1].severity, Severity::Low);
    }

    #[test]
    fn test_scan_theme_directory() {
        let theme = std::env::temp_dir().join(format!("fs-theme-{}", uuid::Uuid::new_v4()));
        let js_dir = theme.join("assets").join("js");
        fs::create_dir_all(&js_dir).unwrap();
        fs::write(js_dir.join("a.js"), "$(f).bind('invalid', x);").unwrap();
        fs::write(js_dir.join("b.js"), "ok();").unwrap();
        fs::write(js_dir.join("notes.txt"), "jquery.validate").unwrap();

        let conflicts = scan_theme(&theme).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].file, "a.js");

        fs::remove_dir_all(&theme).ok();
    }

    #[test]
    fn test_missing_theme_dir_is_empty() {
        let missing = std::env::temp_dir().join(format!("fs-missing-{}", uuid::Uuid::new_v4()));
        assert!(scan_theme(&missing).unwrap().is_empty());
    }
}
