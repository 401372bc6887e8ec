//! `codejson`: infer repository metadata and assemble a `code.json` catalog.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and initialize logging.
//! 2. Load the configuration ([`config::load_config`]).
//! 3. `sanitize`: read raw repositories, run the inference rules
//!    ([`inference`]) through the sanitizer ([`sanitizer`]) and write one
//!    per-source record array.
//! 4. `combine`: merge per-source arrays into `code.json` under the selected
//!    policy ([`combine`]).
//! 5. `review`: print a summary of a catalog ([`report`]); exit `1` when a
//!    release misses a required field.

mod cli;
mod combine;
mod config;
mod inference;
mod models;
mod report;
mod sanitizer;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use cli::{Cli, Command, LogLevel};
use combine::{combine, load_catalog, CombineMode};
use config::{load_config, Config};
use models::{Platform, RawRepository};
use sanitizer::sanitize_all;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Sanitize {
            input,
            output,
            platform,
        } => {
            run_sanitize(config, input, output, platform.into()).await?;
        }
        Command::Combine {
            input_dir,
            output_dir,
            mode,
        } => {
            run_combine(&config, input_dir, output_dir.as_deref(), mode.into())?;
        }
        Command::Review {
            catalog,
            verbose,
            quiet,
        } => {
            let catalog_doc = load_catalog(catalog)?;
            let incomplete = report::terminal::render(&catalog_doc, catalog, *verbose, *quiet)?;
            if incomplete > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .init();
}

async fn run_sanitize(config: Config, input: &Path, output: &Path, platform: Platform) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let repos: Vec<RawRepository> = serde_json::from_str(&content)
        .with_context(|| format!("parsing raw repositories from {}", input.display()))?;

    eprintln!(
        "  {} {} repositories from {}",
        "→".cyan(),
        repos.len(),
        platform
    );

    let pb = ProgressBar::new(repos.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let total = repos.len();
    let mut records = sanitize_all(repos, Arc::new(config), platform, Utc::now(), Some(&pb)).await;
    pb.finish_with_message("Done");

    // completion order is arbitrary; keep the output stable
    records.sort_by(|a, b| a.name.cmp(&b.name).then(a.repo_id.cmp(&b.repo_id)));

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(output, serde_json::to_string_pretty(&records)?)
        .with_context(|| format!("writing {}", output.display()))?;

    eprintln!(
        "  {} {} records written to {} ({} skipped)",
        "✓".green(),
        records.len(),
        output.display(),
        total - records.len()
    );

    Ok(())
}

fn run_combine(
    config: &Config,
    input_dir: &Path,
    output_dir: Option<&Path>,
    mode: CombineMode,
) -> Result<()> {
    match combine(input_dir, output_dir, mode, config)? {
        Some(summary) => {
            eprintln!(
                "  {} {} releases written to {}",
                "✓".green(),
                summary.releases,
                summary.output.display()
            );
            if summary.excluded > 0 {
                eprintln!("  {} {} records excluded", "→".cyan(), summary.excluded);
            }
            if summary.skipped_files > 0 {
                eprintln!(
                    "  {} {} source files skipped",
                    "⚠".yellow(),
                    summary.skipped_files
                );
            }
        }
        None => {
            eprintln!("  {} nothing to combine in {}", "⚠".yellow(), input_dir.display());
        }
    }
    Ok(())
}
