use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Root configuration, deserialized from `.codejson/config.toml`.
///
/// Every field falls back to [`Config::default`], so a config file only needs
/// to name the values it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Top-level agency; used as the catalog `agency` and as the organization
    /// of last resort.
    pub agency_name: String,
    /// Contact for public repositories with no discoverable address, and the
    /// address censored records are reduced to.
    pub default_contact_email: String,
    /// Contact reported for every private or internal repository.
    pub private_repo_contact_email: String,
    /// Only addresses under this domain count as contact emails.
    pub email_domain: String,
    /// Repository URL reported for exempted private repositories.
    pub exempted_notice_url: String,
    /// Repository URL reported for non-exempt private repositories.
    pub instructions_url: String,
    /// Private and internal records last modified before this instant are
    /// left out of a filtered catalog. Written as an RFC 3339 string.
    pub cutoff_date: DateTime<Utc>,
    /// A repository untouched for more than this many days is `inactive`.
    pub inactive_after_days: i64,
    /// Acronym to organization table. Order matters: the first acronym found
    /// in a repository name wins.
    pub organizations: Vec<OrganizationEntry>,
    /// Languages that do not count as code (compared case-insensitively).
    pub non_code_languages: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationEntry {
    pub acronym: String,
    pub name: String,
}

impl OrganizationEntry {
    fn new(acronym: &str, name: &str) -> Self {
        OrganizationEntry {
            acronym: acronym.to_string(),
            name: name.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let organizations = vec![
            OrganizationEntry::new("ocio", "Office of the Chief Information Officer"),
            OrganizationEntry::new("nchs", "National Center for Health Statistics"),
            OrganizationEntry::new(
                "ncird",
                "National Center for Immunization and Respiratory Diseases",
            ),
            OrganizationEntry::new(
                "ncezid",
                "National Center for Emerging and Zoonotic Infectious Diseases",
            ),
            OrganizationEntry::new(
                "nchhstp",
                "National Center for HIV, Viral Hepatitis, STD, and TB Prevention",
            ),
            OrganizationEntry::new(
                "nccdphp",
                "National Center for Chronic Disease Prevention and Health Promotion",
            ),
            OrganizationEntry::new("nceh", "National Center for Environmental Health"),
            OrganizationEntry::new("ncipc", "National Center for Injury Prevention and Control"),
            OrganizationEntry::new(
                "ncbddd",
                "National Center on Birth Defects and Developmental Disabilities",
            ),
            OrganizationEntry::new(
                "niosh",
                "National Institute for Occupational Safety and Health",
            ),
            OrganizationEntry::new("cgh", "Global Health Center"),
            OrganizationEntry::new(
                "csels",
                "Center for Surveillance, Epidemiology, and Laboratory Services",
            ),
            OrganizationEntry::new("cfa", "Center for Forecasting and Outbreak Analytics"),
        ];

        let non_code_languages = [
            "markdown",
            "text",
            "html",
            "css",
            "xml",
            "yaml",
            "json",
            "shell",
            "batchfile",
            "powershell",
            "dockerfile",
            "makefile",
            "cmake",
            "tex",
            "roff",
            "csv",
            "tsv",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Config {
            agency_name: "CDC".to_string(),
            default_contact_email: "shareit@cdc.gov".to_string(),
            private_repo_contact_email: "cdcinfo@cdc.gov".to_string(),
            email_domain: "cdc.gov".to_string(),
            exempted_notice_url:
                "https://github.com/CDCgov/ShareIT-Act/blob/main/docs/assets/files/code_exempted.pdf"
                    .to_string(),
            instructions_url:
                "https://github.com/CDCgov/ShareIT-Act/blob/main/docs/assets/files/instructions.pdf"
                    .to_string(),
            cutoff_date: Utc
                .with_ymd_and_hms(2025, 6, 21, 0, 0, 0)
                .single()
                .expect("valid cutoff date"),
            inactive_after_days: 730,
            organizations,
            non_code_languages,
        }
    }
}

impl Config {
    /// `true` when `language` is on the non-code list.
    pub fn is_non_code_language(&self, language: &str) -> bool {
        self.non_code_languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `./.codejson/config.toml`
/// 3. `~/.config/codejson/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = Path::new(".codejson").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("codejson").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_cutoff() {
        let cfg = Config::default();
        assert_eq!(cfg.cutoff_date.to_rfc3339(), "2025-06-21T00:00:00+00:00");
        assert_eq!(cfg.inactive_after_days, 730);
    }

    #[test]
    fn test_non_code_language_is_case_insensitive() {
        let cfg = Config::default();
        assert!(cfg.is_non_code_language("Markdown"));
        assert!(cfg.is_non_code_language("YAML"));
        assert!(!cfg.is_non_code_language("Python"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let toml = r#"
agency_name = "HHS"
cutoff_date = "2024-01-01T00:00:00Z"

[[organizations]]
acronym = "xyz"
name = "Example Office"
"#;
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", toml).unwrap();
        let cfg = load_config(Some(f.path())).unwrap();
        assert_eq!(cfg.agency_name, "HHS");
        assert_eq!(cfg.cutoff_date.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(cfg.organizations.len(), 1);
        assert_eq!(cfg.organizations[0].name, "Example Office");
        // untouched fields fall back to the built-in values
        assert_eq!(cfg.default_contact_email, "shareit@cdc.gov");
        assert!(cfg.is_non_code_language("markdown"));
    }

    #[test]
    fn test_missing_override_is_an_error() {
        let result = load_config(Some(Path::new("/definitely/not/here.toml")));
        assert!(result.is_err());
    }
}
