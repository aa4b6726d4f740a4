use serde::Serialize;

use crate::conflicts::{self, Conflict};
use crate::scanner::{self, ScanStatistics, ScannedField};
use super::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub fields: Vec<ScannedField>,
    pub statistics: ScanStatistics,
}

pub fn scan_forms(state: &AppState) -> Result<ScanResponse, String> {
    let fields = scanner::scan_all_forms(&*state.db).map_err(|e| e.to_string())?;
    let statistics = scanner::scan_statistics(&*state.db).map_err(|e| e.to_string())?;
    Ok(ScanResponse { fields, statistics })
}

/// Scan the configured theme's scripts plus the given registered script handles.
pub fn scan_js_conflicts(
    state: &AppState,
    registered_handles: Vec<String>,
) -> Result<Vec<Conflict>, String> {
    let theme_dir = state.config_snapshot()?.theme_dir;
    let mut found = match theme_dir {
        Some(dir) => conflicts::scan_theme(&dir).map_err(|e| e.to_string())?,
        None => Vec::new(),
    };
    let handles: Vec<&str> = registered_handles.iter().map(String::as_str).collect();
    found.extend(conflicts::scan_registered_handles(&handles));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_state;
    use crate::db::FormRecord;

    #[test]
    fn test_scan_forms_command() {
        let state = test_state();
        state
            .db
            .upsert_form(&FormRecord {
                id: 1,
                title: "Contact".to_string(),
                content: r#"[text* your-name][email your-email][submit "Send"]"#.to_string(),
                mail_recipient: None,
                status: "publish".to_string(),
            })
            .unwrap();

        let response = scan_forms(&state).unwrap();
        assert_eq!(response.fields.len(), 2);
        assert_eq!(response.statistics.total_forms, 1);
        assert_eq!(response.statistics.total_unique_fields, 2);
    }

    #[test]
    fn test_conflicts_without_theme_dir() {
        let state = test_state();
        let found = scan_js_conflicts(&state, vec!["jquery-validate".to_string()]).unwrap();
        assert_eq!(found.len(), 1);
    }
}
