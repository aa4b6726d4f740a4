use crate::error_log::{parse_date_from, ErrorLog, LogEntry, LogFilter, LogStatistics, LogType};
use super::AppState;

/// Build a filter from the admin screen's query values. Empty strings and
/// a zero form id mean "no filter".
pub fn build_log_filter(
    log_type: Option<String>,
    form_id: Option<u64>,
    date_from: Option<String>,
) -> Result<LogFilter, String> {
    let log_type = match log_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            serde_json::from_value::<LogType>(serde_json::Value::String(raw.to_lowercase()))
                .map_err(|_| format!("Unknown log type: {}", raw))?,
        ),
    };

    let date_from = match date_from.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_date_from(raw).ok_or_else(|| format!("Invalid date: {}", raw))?),
    };

    Ok(LogFilter {
        log_type,
        form_id: form_id.filter(|id| *id != 0),
        date_from,
    })
}

pub fn get_error_logs(
    state: &AppState,
    log_type: Option<String>,
    form_id: Option<u64>,
    date_from: Option<String>,
) -> Result<Vec<LogEntry>, String> {
    let filter = build_log_filter(log_type, form_id, date_from)?;
    ErrorLog::new(&state.db)
        .list(&filter)
        .map_err(|e| e.to_string())
}

pub fn clear_error_logs(state: &AppState) -> Result<(), String> {
    ErrorLog::new(&state.db)
        .clear()
        .map_err(|e| e.to_string())
}

pub fn delete_error_log(state: &AppState, id: String) -> Result<(), String> {
    match ErrorLog::new(&state.db).delete(&id) {
        Ok(true) => Ok(()),
        Ok(false) => Err("Failed to delete log entry.".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

pub fn get_error_statistics(state: &AppState) -> Result<LogStatistics, String> {
    ErrorLog::new(&state.db)
        .statistics()
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_state;
    use crate::error_log::{NewLogEntry, RequestContext};

    fn record(state: &AppState, log_type: LogType, form_id: u64) -> LogEntry {
        ErrorLog::new(&state.db)
            .append(
                NewLogEntry {
                    log_type,
                    form_id,
                    form_title: format!("Form {}", form_id),
                    message: "failed".to_string(),
                    details: serde_json::json!({}),
                },
                &RequestContext::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_build_log_filter() {
        let filter = build_log_filter(Some("Spam".to_string()), Some(0), Some("".to_string())).unwrap();
        assert_eq!(filter.log_type, Some(LogType::Spam));
        assert_eq!(filter.form_id, None);
        assert_eq!(filter.date_from, None);

        assert!(build_log_filter(Some("bogus".to_string()), None, None).is_err());
        assert!(build_log_filter(None, None, Some("yesterday".to_string())).is_err());
        assert!(build_log_filter(None, Some(3), Some("2024-01-31".to_string()))
            .unwrap()
            .date_from
            .is_some());
    }

    #[test]
    fn test_log_commands() {
        let state = test_state();
        record(&state, LogType::Spam, 1);
        let mail = record(&state, LogType::Mail, 2);

        let spam = get_error_logs(&state, Some("spam".to_string()), None, None).unwrap();
        assert_eq!(spam.len(), 1);
        assert_eq!(get_error_logs(&state, None, Some(2), None).unwrap().len(), 1);

        delete_error_log(&state, mail.id.clone()).unwrap();
        assert!(delete_error_log(&state, mail.id).is_err());
        assert_eq!(get_error_statistics(&state).unwrap().total, 1);

        clear_error_logs(&state).unwrap();
        assert_eq!(get_error_statistics(&state).unwrap().total, 0);
    }
}
