use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository as handed over by a platform fetcher, before any inference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRepository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub license: Option<LicenseInfo>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub codeowners: Option<String>,
}

impl RawRepository {
    /// Name used in log lines, `owner/name` when the owner is known.
    pub fn display_name(&self) -> String {
        match (&self.full_name, &self.owner) {
            (Some(full_name), _) => full_name.clone(),
            (None, Some(owner)) => format!("{}/{}", owner, self.name),
            (None, None) => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub name: String,
}

/// One normalized `code.json` project entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMetadataRecord {
    pub name: String,
    pub organization: String,
    pub description: String,
    pub version: String,
    pub labor_hours: u32,
    pub status: String,
    pub vcs: String,
    #[serde(rename = "homepageURL")]
    pub homepage_url: String,
    #[serde(rename = "repositoryURL")]
    pub repository_url: String,
    pub repository_visibility: Visibility,
    pub languages: Vec<String>,
    pub tags: Vec<String>,
    pub contact: Contact,
    pub date: RecordDates,
    pub permissions: Permissions,
    #[serde(rename = "repo_id")]
    pub repo_id: u64,
    #[serde(rename = "private_id")]
    pub private_id: String,
    #[serde(rename = "_url")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDates {
    pub created: Option<String>,
    pub last_modified: Option<String>,
    pub metadata_last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub usage_type: UsageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemption_text: Option<String>,
    pub licenses: Vec<LicenseInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn from_private(private: bool) -> Self {
        if private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }
}

/// Reuse classification under the `code.json` permissions model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageType {
    OpenSource,
    GovernmentWideReuse,
    ExemptByLaw,
    ExemptByNationalSecurity,
    ExemptByAgencySystem,
    ExemptByMissionSystem,
    #[serde(rename = "exemptByCIO")]
    ExemptByCio,
}

impl UsageType {
    pub const EXEMPTIONS: [UsageType; 5] = [
        UsageType::ExemptByLaw,
        UsageType::ExemptByNationalSecurity,
        UsageType::ExemptByAgencySystem,
        UsageType::ExemptByMissionSystem,
        UsageType::ExemptByCio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UsageType::OpenSource => "openSource",
            UsageType::GovernmentWideReuse => "governmentWideReuse",
            UsageType::ExemptByLaw => "exemptByLaw",
            UsageType::ExemptByNationalSecurity => "exemptByNationalSecurity",
            UsageType::ExemptByAgencySystem => "exemptByAgencySystem",
            UsageType::ExemptByMissionSystem => "exemptByMissionSystem",
            UsageType::ExemptByCio => "exemptByCIO",
        }
    }

    /// Look up an exemption code by its exact `code.json` spelling.
    /// Non-exemption usage types are never returned.
    pub fn parse_exemption(code: &str) -> Option<UsageType> {
        Self::EXEMPTIONS.into_iter().find(|u| u.as_str() == code)
    }
}

impl std::fmt::Display for UsageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hosting platform a raw repository was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Github,
    Gitlab,
    Ado,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Github => write!(f, "github"),
            Platform::Gitlab => write!(f, "gitlab"),
            Platform::Ado => write!(f, "ado"),
        }
    }
}

/// The consolidated `code.json` document.
///
/// Releases stay as raw JSON objects: upstream collaborators may hand over
/// records with missing or extra fields and those are carried through as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub version: String,
    pub agency: String,
    pub measurement_type: MeasurementType,
    pub releases: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementType {
    pub method: String,
}

impl Catalog {
    pub const SCHEMA_VERSION: &'static str = "2.0";

    pub fn new(agency: &str, releases: Vec<serde_json::Map<String, serde_json::Value>>) -> Self {
        Catalog {
            version: Self::SCHEMA_VERSION.to_string(),
            agency: agency.to_string(),
            measurement_type: MeasurementType {
                method: "projects".to_string(),
            },
            releases,
        }
    }
}
