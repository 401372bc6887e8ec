//! Field inference chains.
//!
//! Every rule is total: it walks its steps in precedence order, stops at the
//! first one that yields a value, and ends in an unconditional default.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use regex::Regex;
use semver::Version;

use crate::config::Config;
use crate::inference::marker::{extract, Marker};
use crate::models::UsageType;

/// Justification attached to private repositories that hold no code.
pub const NON_CODE_JUSTIFICATION: &str =
    "Repository contains no code or only non-code assets like documentation and configuration.";

/// Outcome of the usage-type rule: the three fields are decided together.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageDecision {
    pub usage_type: UsageType,
    pub exemption_text: Option<String>,
    pub repository_url: String,
}

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

/// README marker → acronym in the repository name → agency name.
pub fn infer_organization(config: &Config, repo_name: &str, readme: Option<&str>) -> String {
    extract(readme, Marker::ORGANIZATION)
        .or_else(|| organization_from_name(config, repo_name))
        .unwrap_or_else(|| config.agency_name.clone())
}

/// First table entry whose acronym is a hyphen-separated token of `repo_name`.
fn organization_from_name(config: &Config, repo_name: &str) -> Option<String> {
    let lower = repo_name.to_lowercase();
    let tokens: Vec<&str> = lower.split('-').collect();
    // `ocio-tools` and `tools-ocio` qualify, a bare `ocio` does not
    if tokens.len() < 2 {
        return None;
    }
    config
        .organizations
        .iter()
        .find(|entry| {
            let acronym = entry.acronym.to_lowercase();
            tokens.iter().any(|t| *t == acronym)
        })
        .map(|entry| entry.name.clone())
}

// ---------------------------------------------------------------------------
// Contact email
// ---------------------------------------------------------------------------

/// Private repositories always get the private contact and their documents are
/// never read. Public ones: marker line → CODEOWNERS → whole README → default.
pub fn infer_contact_email(
    config: &Config,
    is_private: bool,
    readme: Option<&str>,
    codeowners: Option<&str>,
) -> String {
    if is_private {
        return config.private_repo_contact_email.clone();
    }

    let domain = &config.email_domain;
    extract(readme, Marker::CONTACT_EMAIL)
        .and_then(|line| collect_emails(&line, domain))
        .or_else(|| codeowners.and_then(|c| collect_emails(c, domain)))
        .or_else(|| readme.and_then(|r| collect_emails(r, domain)))
        .unwrap_or_else(|| config.default_contact_email.clone())
}

/// All addresses under `domain` in `text`, de-duplicated, sorted and joined
/// with `;`. `None` when there are none.
fn collect_emails(text: &str, domain: &str) -> Option<String> {
    let re = Regex::new(&format!(r"[\w.+-]+@{}", regex::escape(domain))).ok()?;
    let emails: BTreeSet<&str> = re.find_iter(text).map(|m| m.as_str()).collect();
    if emails.is_empty() {
        None
    } else {
        Some(emails.into_iter().collect::<Vec<_>>().join(";"))
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Archived flag → README marker (lower-cased) → inactive after the configured
/// number of days without a push → `development`.
pub fn infer_status(
    config: &Config,
    archived: bool,
    pushed_at: Option<DateTime<Utc>>,
    readme: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    if archived {
        return "archived".to_string();
    }

    extract(readme, Marker::STATUS)
        .map(|s| s.to_lowercase())
        .or_else(|| {
            let idle_days = now.signed_duration_since(pushed_at?).num_days();
            (idle_days > config.inactive_after_days).then(|| "inactive".to_string())
        })
        .unwrap_or_else(|| "development".to_string())
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Highest released version among the tags → README marker → `N/A`.
pub fn infer_version(tags: &[String], readme: Option<&str>) -> String {
    tags.iter()
        .filter_map(|tag| parse_tag(tag))
        .filter(|v| v.pre.is_empty())
        .max()
        .map(|v| v.to_string())
        .or_else(|| extract(readme, Marker::VERSION))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Parse a tag such as `v1.4.2` or `1.4`. One leading `v`/`V` is dropped and
/// short `major[.minor]` forms are padded with zeros.
fn parse_tag(tag: &str) -> Option<Version> {
    let raw = tag.trim();
    let raw = raw.strip_prefix(['v', 'V']).unwrap_or(raw);

    if let Ok(version) = Version::parse(raw) {
        return Some(version);
    }

    let parts: Vec<&str> = raw.split('.').collect();
    let numeric = parts
        .iter()
        .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    if parts.len() >= 3 || !numeric {
        return None;
    }

    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    Version::parse(&padded).ok()
}

// ---------------------------------------------------------------------------
// Usage type / exemption / repository URL
// ---------------------------------------------------------------------------

/// Decide `usageType`, `exemptionText` and the published repository URL.
///
/// Public repositories are `openSource` when licensed and
/// `governmentWideReuse` otherwise, and keep their platform URL. Private ones
/// go through: README exemption marker → non-code language set →
/// `governmentWideReuse` with the instructions URL.
pub fn infer_usage(
    config: &Config,
    is_private: bool,
    has_license: bool,
    html_url: &str,
    readme: Option<&str>,
    languages: &[String],
) -> UsageDecision {
    if !is_private {
        let usage_type = if has_license {
            UsageType::OpenSource
        } else {
            UsageType::GovernmentWideReuse
        };
        return UsageDecision {
            usage_type,
            exemption_text: None,
            repository_url: html_url.to_string(),
        };
    }

    exemption_from_marker(config, readme)
        .or_else(|| exemption_for_non_code(config, languages))
        .unwrap_or_else(|| UsageDecision {
            usage_type: UsageType::GovernmentWideReuse,
            exemption_text: None,
            repository_url: config.instructions_url.clone(),
        })
}

fn exemption_from_marker(config: &Config, readme: Option<&str>) -> Option<UsageDecision> {
    let usage_type = extract(readme, Marker::EXEMPTION)
        .and_then(|code| UsageType::parse_exemption(&code))?;
    Some(UsageDecision {
        usage_type,
        exemption_text: extract(readme, Marker::EXEMPTION_JUSTIFICATION),
        repository_url: config.exempted_notice_url.clone(),
    })
}

fn exemption_for_non_code(config: &Config, languages: &[String]) -> Option<UsageDecision> {
    let only_non_code = languages
        .iter()
        .filter(|l| !l.is_empty())
        .all(|l| config.is_non_code_language(l));
    if !only_non_code {
        return None;
    }
    Some(UsageDecision {
        usage_type: UsageType::ExemptByCio,
        exemption_text: Some(NON_CODE_JUSTIFICATION.to_string()),
        repository_url: config.exempted_notice_url.clone(),
    })
}
