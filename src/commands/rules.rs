use crate::validation::{RuleTable, ValidationRules};
use super::AppState;

pub fn get_validation_rules(state: &AppState) -> Result<RuleTable, String> {
    ValidationRules::new(&state.db)
        .get_rules()
        .map_err(|e| e.to_string())
}

/// Replace the whole rule table.
pub fn save_validation_rules(state: &AppState, rules: RuleTable) -> Result<(), String> {
    ValidationRules::new(&state.db)
        .set_rules(rules)
        .map_err(|e| e.to_string())
}
