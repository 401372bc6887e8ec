use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;

use crate::config::Config;
use crate::inference::rules::{
    infer_contact_email, infer_organization, infer_status, infer_usage, infer_version,
};
use crate::models::{
    CanonicalMetadataRecord, Contact, Permissions, Platform, RawRepository, RecordDates,
    Visibility,
};

/// Repositories sanitized concurrently by [`sanitize_all`].
pub const WORKERS: usize = 4;

/// Build the canonical record for one repository.
///
/// Forks and empty repositories are skipped and yield `None`.
pub fn sanitize(
    repo: &RawRepository,
    config: &Config,
    platform: Platform,
    now: DateTime<Utc>,
) -> Option<CanonicalMetadataRecord> {
    if repo.fork {
        log::info!("Skipping forked repository: {}", repo.display_name());
        return None;
    }
    if repo.size == 0 {
        log::info!("Skipping empty repository: {}", repo.display_name());
        return None;
    }

    let readme = repo.readme.as_deref();
    let codeowners = repo.codeowners.as_deref();

    let usage = infer_usage(
        config,
        repo.private,
        repo.license.is_some(),
        &repo.html_url,
        readme,
        &repo.languages,
    );

    let record = CanonicalMetadataRecord {
        name: repo.name.clone(),
        organization: infer_organization(config, &repo.name, readme),
        description: repo.description.clone().unwrap_or_default(),
        version: infer_version(&repo.tags, readme),
        labor_hours: 0,
        status: infer_status(config, repo.archived, repo.pushed_at, readme, now),
        vcs: "git".to_string(),
        homepage_url: repo.homepage.clone().unwrap_or_default(),
        repository_url: usage.repository_url,
        repository_visibility: Visibility::from_private(repo.private),
        languages: repo.languages.clone(),
        tags: repo.topics.clone(),
        contact: Contact {
            email: infer_contact_email(config, repo.private, readme, codeowners),
        },
        date: RecordDates {
            created: repo.created_at.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, false)),
            last_modified: repo.pushed_at.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, false)),
            metadata_last_updated: now.to_rfc3339_opts(SecondsFormat::Secs, false),
        },
        permissions: Permissions {
            usage_type: usage.usage_type,
            exemption_text: usage.exemption_text,
            licenses: repo.license.iter().cloned().collect(),
        },
        repo_id: repo.id,
        private_id: format!("{}_{}", platform, repo.id),
        url: repo.html_url.clone(),
    };

    log::debug!(
        "Sanitized {} as {} ({})",
        repo.display_name(),
        record.permissions.usage_type,
        record.status
    );

    Some(record)
}

/// Sanitize a batch on a pool of [`WORKERS`] blocking tasks.
///
/// Records come back in completion order; callers that need a stable order
/// sort the result. A task that fails only loses its own repository.
pub async fn sanitize_all(
    repos: Vec<RawRepository>,
    config: Arc<Config>,
    platform: Platform,
    now: DateTime<Utc>,
    progress: Option<&ProgressBar>,
) -> Vec<CanonicalMetadataRecord> {
    let tasks = repos.into_iter().map(|repo| {
        let config = Arc::clone(&config);
        async move {
            let name = repo.display_name();
            let handle = tokio::task::spawn_blocking(move || sanitize(&repo, &config, platform, now));
            (name, handle.await)
        }
    });

    let mut results = stream::iter(tasks).buffer_unordered(WORKERS);
    let mut records = Vec::new();

    while let Some((name, result)) = results.next().await {
        match result {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => log::error!("Failed processing repository {name}: {e}"),
        }
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LicenseInfo, UsageType};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()
    }

    fn repo(name: &str) -> RawRepository {
        RawRepository {
            id: 42,
            name: name.to_string(),
            full_name: Some(format!("CDCgov/{name}")),
            html_url: format!("https://github.com/CDCgov/{name}"),
            size: 120,
            pushed_at: Some(Utc.with_ymd_and_hms(2025, 11, 2, 8, 30, 0).unwrap()),
            created_at: Some(Utc.with_ymd_and_hms(2021, 4, 1, 0, 0, 0).unwrap()),
            languages: vec!["Python".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_forks_and_empty_repositories_are_skipped() {
        let cfg = Config::default();
        let mut fork = repo("forked");
        fork.fork = true;
        assert!(sanitize(&fork, &cfg, Platform::Github, now()).is_none());

        let mut empty = repo("empty");
        empty.size = 0;
        assert!(sanitize(&empty, &cfg, Platform::Github, now()).is_none());
    }

    #[test]
    fn test_public_licensed_repository() {
        let cfg = Config::default();
        let mut r = repo("ocio-toolkit");
        r.license = Some(LicenseInfo {
            name: "MIT License".to_string(),
        });
        r.tags = vec!["v1.2.0".to_string(), "v2.0.0-rc1".to_string()];
        r.description = Some("Shared tooling".to_string());

        let record = sanitize(&r, &cfg, Platform::Github, now()).unwrap();
        assert_eq!(record.version, "1.2.0");
        assert_eq!(record.permissions.usage_type, UsageType::OpenSource);
        assert_eq!(record.permissions.exemption_text, None);
        assert_eq!(record.permissions.licenses.len(), 1);
        assert_eq!(record.organization, "Office of the Chief Information Officer");
        assert_eq!(record.repository_url, "https://github.com/CDCgov/ocio-toolkit");
        assert_eq!(record.repository_visibility, Visibility::Public);
        assert_eq!(record.contact.email, "shareit@cdc.gov");
        assert_eq!(record.status, "development");
        assert_eq!(record.private_id, "github_42");
        assert_eq!(record.date.last_modified.as_deref(), Some("2025-11-02T08:30:00+00:00"));
    }

    #[test]
    fn test_private_repository_with_exemption_marker() {
        let cfg = Config::default();
        let mut r = repo("pilot");
        r.private = true;
        r.readme = Some(
            "# Pilot\nExemption: exemptByCIO\nExemption justification: Demo only\nContact email: a@cdc.gov\n"
                .to_string(),
        );

        let record = sanitize(&r, &cfg, Platform::Gitlab, now()).unwrap();
        assert_eq!(record.permissions.usage_type, UsageType::ExemptByCio);
        assert_eq!(record.permissions.exemption_text.as_deref(), Some("Demo only"));
        assert_eq!(record.repository_url, cfg.exempted_notice_url);
        assert_eq!(record.contact.email, cfg.private_repo_contact_email);
        assert_eq!(record.repository_visibility, Visibility::Private);
        assert_eq!(record.private_id, "gitlab_42");
        assert_eq!(record.url, "https://github.com/CDCgov/pilot");
    }

    #[test]
    fn test_private_repository_with_only_documentation() {
        let cfg = Config::default();
        let mut r = repo("handbook");
        r.private = true;
        r.languages = vec!["Markdown".to_string(), "YAML".to_string()];

        let record = sanitize(&r, &cfg, Platform::Ado, now()).unwrap();
        assert_eq!(record.permissions.usage_type, UsageType::ExemptByCio);
        assert_eq!(
            record.permissions.exemption_text.as_deref(),
            Some(crate::inference::rules::NON_CODE_JUSTIFICATION)
        );
        assert_eq!(record.repository_url, cfg.exempted_notice_url);
        assert_eq!(record.private_id, "ado_42");
    }

    #[test]
    fn test_serialized_record_uses_codejson_keys() {
        let cfg = Config::default();
        let record = sanitize(&repo("survey"), &cfg, Platform::Github, now()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["repositoryURL"], "https://github.com/CDCgov/survey");
        assert_eq!(json["repositoryVisibility"], "public");
        assert_eq!(json["permissions"]["usageType"], "governmentWideReuse");
        assert!(json["permissions"].get("exemptionText").is_none());
        assert_eq!(json["laborHours"], 0);
        assert_eq!(json["private_id"], "github_42");
        assert_eq!(json["_url"], "https://github.com/CDCgov/survey");
        assert_eq!(json["date"]["metadataLastUpdated"], "2026-01-15T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_sanitize_all_collects_qualifying_records() {
        let cfg = Arc::new(Config::default());
        let mut fork = repo("fork");
        fork.fork = true;
        let repos: Vec<RawRepository> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|n| repo(n))
            .chain(std::iter::once(fork))
            .collect();

        let mut records = sanitize_all(repos, cfg, Platform::Github, now(), None).await;
        records.sort_by(|a, b| a.name.cmp(&b.name));
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e", "f"]);
    }
}
