//! Inclusion and redaction rules applied per record while combining.
//!
//! Records are handled as raw JSON objects so that upstream files with
//! missing fields still pass through. A missing or malformed field never
//! causes an exclusion on its own.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

pub type Record = Map<String, Value>;

/// Source files from internally hosted platforms (Azure DevOps, GitLab).
pub fn is_internal_source(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.contains("ado") || lower.contains("gitlab")
}

/// `repositoryVisibility` is `private`, ignoring case.
pub fn is_private_record(record: &Record) -> bool {
    record
        .get("repositoryVisibility")
        .and_then(Value::as_str)
        .is_some_and(|v| v.eq_ignore_ascii_case("private"))
}

/// Records that must not appear in a public catalog, and that are censored
/// in a filtered one.
pub fn is_internal_or_private(file_name: &str, record: &Record) -> bool {
    is_internal_source(file_name) || is_private_record(record)
}

/// `true` when `date` is strictly before `cutoff`.
///
/// A trailing `Z` is read as `+00:00`. Dates that cannot be parsed are logged
/// and count as not before the cutoff.
pub fn is_before_cutoff(cutoff: DateTime<Utc>, date: &str) -> bool {
    let normalized = match date.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => date.to_string(),
    };
    match DateTime::parse_from_rfc3339(&normalized) {
        Ok(parsed) => parsed.with_timezone(&Utc) < cutoff,
        Err(e) => {
            log::warn!("Could not parse date: {date} ({e})");
            false
        }
    }
}

fn last_modified(record: &Record) -> Option<&str> {
    record
        .get("date")
        .and_then(|d| d.get("lastModified"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn modified_before_cutoff(record: &Record, cutoff: DateTime<Utc>) -> bool {
    last_modified(record).is_some_and(|date| is_before_cutoff(cutoff, date))
}

/// Exclusion test of the filtered catalog.
///
/// Internal-platform records and private records are dropped only when they
/// carry a last-modified date before the cutoff. Everything else stays.
pub fn should_exclude(file_name: &str, record: &Record, cutoff: DateTime<Utc>) -> bool {
    if is_internal_source(file_name) {
        return modified_before_cutoff(record, cutoff);
    }
    if is_private_record(record) {
        return modified_before_cutoff(record, cutoff);
    }
    false
}

/// Redact internal URLs and contacts from internal-platform or private
/// records. Other records are returned unchanged.
pub fn censor(file_name: &str, record: &Record, default_contact: &str) -> Record {
    let mut censored = record.clone();
    if is_internal_or_private(file_name, record) {
        censored.remove("_url");
        censored.insert("contact".to_string(), json!({ "email": default_contact }));
        censored.insert("homepageURL".to_string(), json!(""));
        censored.insert("repositoryURL".to_string(), json!(""));
    }
    censored
}

/// Insert an empty `description` when the record has none.
pub fn default_description(record: &mut Record) {
    record
        .entry("description")
        .or_insert_with(|| Value::String(String::new()));
}
