use serde_json::Value;

use crate::combine::policy::Record;
use crate::models::UsageType;

/// Fields every `code.json` release must carry, as dotted paths.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "description",
    "organization",
    "repositoryURL",
    "repositoryVisibility",
    "permissions.usageType",
    "permissions.licenses",
];

/// Required fields that are absent or null in `record`.
///
/// `permissions.exemptionText` is only required when the usage type is an
/// exemption. Empty strings count as present: censored records legitimately
/// carry an empty `repositoryURL`.
pub fn missing_required_fields(record: &Record) -> Vec<&'static str> {
    let mut missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|path| lookup(record, path).is_none())
        .collect();

    let exempt = lookup(record, "permissions.usageType")
        .and_then(Value::as_str)
        .and_then(UsageType::parse_exemption)
        .is_some();
    if exempt && lookup(record, "permissions.exemptionText").is_none() {
        missing.push("permissions.exemptionText");
    }

    missing
}

fn lookup<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = record.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    (!current.is_null()).then_some(current)
}
