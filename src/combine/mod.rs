//! Merge per-source record files into one `code.json` catalog.
//!
//! - [`policy`]: internal-platform / private predicates, cutoff exclusion and
//!   the censorship transform.
//!
//! Source files that cannot be read, are not JSON, or are not a top-level
//! array are logged and skipped; the remaining files are still combined. The
//! catalog is assembled in memory and written once, and only when at least one
//! record survived.

pub mod policy;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::Config;
use crate::models::Catalog;
use policy::{censor, default_description, is_internal_or_private, should_exclude, Record};

/// File name of the consolidated catalog.
pub const CATALOG_FILE_NAME: &str = "code.json";

/// How records are selected for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMode {
    /// Every record from every valid source file.
    Concat,
    /// Drop internal-platform and private records.
    Public,
    /// Censor internal-platform and private records, drop the ones last
    /// modified before the cutoff.
    Filter,
}

impl std::fmt::Display for CombineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CombineMode::Concat => write!(f, "concat"),
            CombineMode::Public => write!(f, "public"),
            CombineMode::Filter => write!(f, "filter"),
        }
    }
}

/// What a successful combine wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct CombineSummary {
    pub output: PathBuf,
    pub releases: usize,
    pub excluded: usize,
    pub skipped_files: usize,
}

/// Combine every `*.json` file in `input_dir` into `<output_dir>/code.json`.
///
/// `output_dir` defaults to `input_dir`. Returns `Ok(None)` without writing
/// anything when the input directory is missing, holds no JSON files, or
/// yields no records.
pub fn combine(
    input_dir: &Path,
    output_dir: Option<&Path>,
    mode: CombineMode,
    config: &Config,
) -> Result<Option<CombineSummary>> {
    if !input_dir.is_dir() {
        log::error!("Directory not found: {}", input_dir.display());
        return Ok(None);
    }

    log::info!("Combining JSON files from {} ({mode} mode)", input_dir.display());
    let files = source_files(input_dir)?;
    if files.is_empty() {
        log::warn!("No JSON files found in {}", input_dir.display());
        return Ok(None);
    }

    let mut releases = Vec::new();
    let mut excluded = 0;
    let mut skipped_files = 0;

    for path in &files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!("Reading {file_name}");

        let Some(entries) = read_source(path, &file_name) else {
            skipped_files += 1;
            continue;
        };

        for entry in entries {
            let Value::Object(record) = entry else {
                log::warn!("Skipping non-object entry in {file_name}");
                continue;
            };
            match select(mode, &file_name, record, config) {
                Some(kept) => releases.push(kept),
                None => excluded += 1,
            }
        }
    }

    if releases.is_empty() {
        log::warn!("No valid data found");
        return Ok(None);
    }

    let output_dir = output_dir.unwrap_or(input_dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let output = output_dir.join(CATALOG_FILE_NAME);

    let total = releases.len();
    let catalog = Catalog::new(&config.agency_name, releases);
    write_catalog(&output, &catalog)?;

    log::info!("Combined data saved to {}", output.display());
    log::info!("Total repositories: {total}");

    Ok(Some(CombineSummary {
        output,
        releases: total,
        excluded,
        skipped_files,
    }))
}

/// Apply `mode` to one record. `None` means the record is left out.
fn select(mode: CombineMode, file_name: &str, mut record: Record, config: &Config) -> Option<Record> {
    match mode {
        CombineMode::Concat => {
            default_description(&mut record);
            Some(record)
        }
        CombineMode::Public => {
            if is_internal_or_private(file_name, &record) {
                return None;
            }
            default_description(&mut record);
            Some(record)
        }
        CombineMode::Filter => {
            let exclude = should_exclude(file_name, &record, config.cutoff_date);
            let mut censored = censor(file_name, &record, &config.default_contact_email);
            if exclude {
                return None;
            }
            default_description(&mut censored);
            Some(censored)
        }
    }
}

/// `*.json` files directly under `dir`, sorted by name. A catalog left behind
/// by an earlier run is not treated as a source.
fn source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("listing directory {}", dir.display()))?
    {
        let path = entry?.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json || !path.is_file() {
            continue;
        }
        if path.file_name().is_some_and(|n| n == CATALOG_FILE_NAME) {
            log::debug!("Ignoring existing catalog {}", path.display());
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Read one source file as a JSON array. Failures are logged and yield `None`.
fn read_source(path: &Path, file_name: &str) -> Option<Vec<Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::error!("Error processing {file_name}: {e}");
            return None;
        }
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(entries)) => Some(entries),
        Ok(_) => {
            log::error!("Error: {file_name} does not contain a list of objects, skipping");
            None
        }
        Err(e) => {
            log::error!("Error: {file_name} is not valid JSON, skipping ({e})");
            None
        }
    }
}

/// Write `catalog` as pretty-printed JSON.
pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Read a `code.json` catalog back.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let catalog = serde_json::from_str(&content)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, value: &Value) {
        std::fs::write(dir.join(name), serde_json::to_string(value).unwrap()).unwrap();
    }

    fn released_names(catalog: &Catalog) -> Vec<String> {
        catalog
            .releases
            .iter()
            .map(|r| r["name"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "ado-export.json",
            &json!([
                {
                    "name": "old-internal",
                    "repositoryVisibility": "private",
                    "repositoryURL": "https://dev.azure.com/cdc/old",
                    "date": { "lastModified": "2025-01-01T00:00:00Z" }
                },
                {
                    "name": "new-internal",
                    "description": "kept",
                    "repositoryVisibility": "private",
                    "repositoryURL": "https://dev.azure.com/cdc/new",
                    "homepageURL": "https://intranet/new",
                    "_url": "https://dev.azure.com/cdc/new",
                    "contact": { "email": "team@cdc.gov" },
                    "date": { "lastModified": "2025-12-01T00:00:00Z" }
                }
            ]),
        );
        write(
            dir.path(),
            "github-cdcgov.json",
            &json!([
                {
                    "name": "public-tool",
                    "repositoryVisibility": "public",
                    "repositoryURL": "https://github.com/CDCgov/public-tool",
                    "contact": { "email": "owner@cdc.gov" },
                    "date": { "lastModified": "2020-01-01T00:00:00Z" }
                },
                {
                    "name": "old-private",
                    "repositoryVisibility": "private",
                    "date": { "lastModified": "2024-02-01T00:00:00Z" }
                }
            ]),
        );
        write(dir.path(), "broken.json", &json!({ "not": "an array" }));
        std::fs::write(dir.path().join("garbage.json"), "{ nope").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        dir
    }

    #[test]
    fn test_concat_includes_everything() {
        let dir = fixture();
        let cfg = Config::default();
        let summary = combine(dir.path(), None, CombineMode::Concat, &cfg)
            .unwrap()
            .unwrap();
        assert_eq!(summary.releases, 4);
        assert_eq!(summary.skipped_files, 2);

        let catalog = load_catalog(&summary.output).unwrap();
        assert_eq!(catalog.version, "2.0");
        assert_eq!(catalog.agency, "CDC");
        assert_eq!(catalog.measurement_type.method, "projects");
        assert!(catalog.releases.iter().all(|r| r.contains_key("description")));
        assert_eq!(catalog.releases[0]["description"], "");
        assert_eq!(catalog.releases[1]["description"], "kept");
    }

    #[test]
    fn test_public_mode_drops_internal_and_private() {
        let dir = fixture();
        let cfg = Config::default();
        let summary = combine(dir.path(), None, CombineMode::Public, &cfg)
            .unwrap()
            .unwrap();
        let catalog = load_catalog(&summary.output).unwrap();
        assert_eq!(released_names(&catalog), vec!["public-tool"]);
        assert_eq!(summary.excluded, 3);
        // surviving records are not censored
        assert_eq!(catalog.releases[0]["contact"]["email"], "owner@cdc.gov");
    }

    #[test]
    fn test_filter_mode_excludes_old_and_censors_internal() {
        let dir = fixture();
        let out = TempDir::new().unwrap();
        let cfg = Config::default();
        let summary = combine(dir.path(), Some(out.path()), CombineMode::Filter, &cfg)
            .unwrap()
            .unwrap();
        assert_eq!(summary.output, out.path().join(CATALOG_FILE_NAME));

        let catalog = load_catalog(&summary.output).unwrap();
        assert_eq!(released_names(&catalog), vec!["new-internal", "public-tool"]);

        let internal = &catalog.releases[0];
        assert_eq!(internal["repositoryURL"], "");
        assert_eq!(internal["homepageURL"], "");
        assert_eq!(internal["contact"], json!({ "email": "shareit@cdc.gov" }));
        assert!(internal.get("_url").is_none());
        assert_eq!(internal["description"], "kept");

        let public = &catalog.releases[1];
        assert_eq!(public["repositoryURL"], "https://github.com/CDCgov/public-tool");
        assert_eq!(public["contact"]["email"], "owner@cdc.gov");
        assert_eq!(public["description"], "");
    }

    #[test]
    fn test_nothing_written_without_records() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "empty.json", &json!([]));
        let cfg = Config::default();
        let result = combine(dir.path(), None, CombineMode::Concat, &cfg).unwrap();
        assert!(result.is_none());
        assert!(!dir.path().join(CATALOG_FILE_NAME).exists());
    }

    #[test]
    fn test_missing_or_empty_directory() {
        let cfg = Config::default();
        let missing = Path::new("/definitely/not/a/dir");
        assert!(combine(missing, None, CombineMode::Filter, &cfg)
            .unwrap()
            .is_none());

        let dir = TempDir::new().unwrap();
        assert!(combine(dir.path(), None, CombineMode::Filter, &cfg)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_previous_catalog_is_not_a_source() {
        let dir = fixture();
        let cfg = Config::default();
        combine(dir.path(), None, CombineMode::Concat, &cfg).unwrap();
        let again = combine(dir.path(), None, CombineMode::Concat, &cfg)
            .unwrap()
            .unwrap();
        assert_eq!(again.releases, 4);
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "mixed.json", &json!([1, "two", { "name": "three" }]));
        let cfg = Config::default();
        let summary = combine(dir.path(), None, CombineMode::Concat, &cfg)
            .unwrap()
            .unwrap();
        assert_eq!(summary.releases, 1);
    }
}
