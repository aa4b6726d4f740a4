//! Bounded, newest-first log of failed form submissions.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{Database, OptionName};
use crate::error::Result;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Oldest entries past this count are dropped on append.
pub const MAX_LOG_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Validation,
    Spam,
    Mail,
    Field,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub form_id: u64,
    pub form_title: String,
    pub message: String,
    #[serde(default)]
    pub details: serde_json::Value,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub user_agent: String,
}

impl LogEntry {
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}

/// What a producer supplies; id, timestamp and caller info are filled in on append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub log_type: LogType,
    pub form_id: u64,
    pub form_title: String,
    pub message: String,
    pub details: serde_json::Value,
}

/// Caller information captured from the inbound request.
///
/// The IP chain is client-supplied and only fit for attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub client_ip: Option<String>,
    pub forwarded_for: Option<String>,
    pub remote_addr: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Client-IP header, then forwarded-for, then the socket address.
    pub fn ip_address(&self) -> String {
        [&self.client_ip, &self.forwarded_for, &self.remote_addr]
            .into_iter()
            .flatten()
            .map(|ip| sanitize_text(ip))
            .find(|ip| !ip.is_empty())
            .unwrap_or_default()
    }

    pub fn user_agent(&self) -> String {
        self.user_agent.as_deref().map(sanitize_text).unwrap_or_default()
    }
}

/// Trim and drop control characters and markup tags. A `<` only opens a
/// tag when followed by a letter, `/` or `!` and later closed by `>`;
/// otherwise it is kept as text.
fn sanitize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(c) = rest.chars().next() {
        let after = &rest[c.len_utf8()..];
        let opens_tag =
            after.starts_with(|n: char| n.is_ascii_alphabetic() || n == '/' || n == '!');
        if c == '<' && opens_tag {
            if let Some(end) = after.find('>') {
                rest = &after[end + 1..];
                continue;
            }
        }
        if !c.is_control() {
            out.push(c);
        }
        rest = after;
    }
    out.trim().to_string()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    pub log_type: Option<LogType>,
    pub form_id: Option<u64>,
    /// Inclusive lower bound on the entry timestamp
    pub date_from: Option<NaiveDateTime>,
}

impl LogFilter {
    fn matches(&self, entry: &LogEntry) -> bool {
        if self.log_type.is_some_and(|t| t != entry.log_type) {
            return false;
        }
        if self.form_id.is_some_and(|id| id != entry.form_id) {
            return false;
        }
        match self.date_from {
            Some(from) => entry.recorded_at().is_some_and(|at| at >= from),
            None => true,
        }
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a bare date (midnight).
pub fn parse_date_from(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    NaiveDateTime::parse_from_str(input, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub validation: usize,
    pub spam: usize,
    pub mail: usize,
    pub field: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogStatistics {
    pub total: usize,
    pub by_type: TypeCounts,
    /// Keyed by `"{form_id}|{form_title}"`
    pub by_form: BTreeMap<String, usize>,
}

pub struct ErrorLog<'a> {
    db: &'a Database,
}

impl<'a> ErrorLog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn load(&self) -> Result<Vec<LogEntry>> {
        Ok(self.db.load_document(OptionName::ErrorLogs)?)
    }

    /// Prepend an entry and drop everything past the cap.
    pub fn append(&self, entry: NewLogEntry, request: &RequestContext) -> Result<LogEntry> {
        let entry = LogEntry {
            id: format!("error_{}", Uuid::new_v4().simple()),
            timestamp: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
            log_type: entry.log_type,
            form_id: entry.form_id,
            form_title: entry.form_title,
            message: entry.message,
            details: entry.details,
            ip_address: request.ip_address(),
            user_agent: request.user_agent(),
        };

        let mut logs = self.load()?;
        logs.insert(0, entry.clone());
        logs.truncate(MAX_LOG_ENTRIES);
        self.db.save_document(OptionName::ErrorLogs, &logs)?;

        log::debug!(
            "Logged {:?} error for form {} ({} entries kept)",
            entry.log_type,
            entry.form_id,
            logs.len()
        );
        Ok(entry)
    }

    pub fn list(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
        let mut logs = self.load()?;
        logs.retain(|entry| filter.matches(entry));
        Ok(logs)
    }

    pub fn clear(&self) -> Result<()> {
        self.db.save_document(OptionName::ErrorLogs, &Vec::<LogEntry>::new())?;
        log::info!("Cleared error log");
        Ok(())
    }

    /// Returns false when no entry has this id.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut logs = self.load()?;
        let Some(pos) = logs.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        logs.remove(pos);
        self.db.save_document(OptionName::ErrorLogs, &logs)?;
        Ok(true)
    }

    pub fn statistics(&self) -> Result<LogStatistics> {
        let logs = self.load()?;
        let mut stats = LogStatistics {
            total: logs.len(),
            ..Default::default()
        };

        for entry in &logs {
            let counter = match entry.log_type {
                LogType::Validation => &mut stats.by_type.validation,
                LogType::Spam => &mut stats.by_type.spam,
                LogType::Mail => &mut stats.by_type.mail,
                LogType::Field => &mut stats.by_type.field,
            };
            *counter += 1;

            *stats
                .by_form
                .entry(format!("{}|{}", entry.form_id, entry.form_title))
                .or_insert(0) += 1;
        }

        Ok(stats)
    }
}
