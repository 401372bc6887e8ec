use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use serde_json::Value;

use crate::combine::policy::Record;
use crate::models::{Catalog, UsageType};
use crate::report::completeness::missing_required_fields;

/// Render a colored review of a catalog.
///
/// Returns the number of releases missing at least one required field.
pub fn render(catalog: &Catalog, path: &Path, verbose: bool, quiet: bool) -> Result<usize> {
    let total = catalog.releases.len();
    let incomplete: Vec<(&Record, Vec<&'static str>)> = catalog
        .releases
        .iter()
        .map(|r| (r, missing_required_fields(r)))
        .filter(|(_, missing)| !missing.is_empty())
        .collect();
    let exempt_count = catalog
        .releases
        .iter()
        .filter(|r| UsageType::parse_exemption(field(r, "permissions", "usageType")).is_some())
        .count();
    let private_count = catalog
        .releases
        .iter()
        .filter(|r| text(r, "repositoryVisibility").eq_ignore_ascii_case("private"))
        .count();

    if quiet {
        println!(
            "Total: {}  Private: {}  Exempt: {}  Incomplete: {}",
            total,
            private_count.to_string().yellow(),
            exempt_count.to_string().cyan(),
            incomplete.len().to_string().red(),
        );
        return Ok(incomplete.len());
    }

    println!(
        "\n {} v{}",
        "codejson".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Reviewing: {} ({} {})\n", path.display(), catalog.agency, catalog.version);

    let usage_summary = summarize(catalog, |r| field(r, "permissions", "usageType"));
    let status_summary = summarize(catalog, |r| text(r, "status"));

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Total releases     : {}", total));
    println!(
        " │  {:<48} │",
        format!("{}  Private         : {:>4}", "●".yellow(), private_count)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Exempt          : {:>4}", "◆".cyan(), exempt_count)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Incomplete      : {:>4}", "✗".red(), incomplete.len())
    );
    println!(" │  {:<48} │", format!("Usage  {}", usage_summary));
    println!(" │  {:<48} │", format!("Status {}", status_summary));
    println!(" └────────────────────────────────────────────────────┘\n");

    if !incomplete.is_empty() {
        println!(" {} Releases missing required fields:\n", "[ERROR]".red().bold());
        render_incomplete(&incomplete);
        println!();
    }

    if verbose && total > 0 {
        println!(" {} All releases:\n", "[INFO]".green().bold());
        render_releases(&catalog.releases);
        println!();
    }

    Ok(incomplete.len())
}

fn render_incomplete(incomplete: &[(&Record, Vec<&'static str>)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Visibility").add_attribute(Attribute::Bold),
            Cell::new("Missing").add_attribute(Attribute::Bold),
        ]);

    for (record, missing) in incomplete {
        table.add_row(vec![
            Cell::new(text(record, "name")),
            Cell::new(text(record, "repositoryVisibility")),
            Cell::new(missing.join(", ")).fg(Color::Red),
        ]);
    }

    println!("{}", table);
}

fn render_releases(releases: &[Record]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Organization").add_attribute(Attribute::Bold),
            Cell::new("Visibility").add_attribute(Attribute::Bold),
            Cell::new("Usage Type").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Contact").add_attribute(Attribute::Bold),
        ]);

    for record in releases {
        let usage = field(record, "permissions", "usageType");
        let usage_color = match usage {
            "openSource" => Color::Green,
            "governmentWideReuse" => Color::Blue,
            u if u.starts_with("exempt") => Color::Yellow,
            _ => Color::DarkGrey,
        };
        let visibility = text(record, "repositoryVisibility");
        let visibility_color = if visibility.eq_ignore_ascii_case("private") {
            Color::Yellow
        } else {
            Color::Green
        };

        table.add_row(vec![
            Cell::new(text(record, "name")),
            Cell::new(text(record, "organization")),
            Cell::new(visibility).fg(visibility_color),
            Cell::new(usage).fg(usage_color),
            Cell::new(text(record, "status")),
            Cell::new(text(record, "version")),
            Cell::new(field(record, "contact", "email")),
        ]);
    }

    println!("{}", table);
}

fn text<'a>(record: &'a Record, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}

fn field<'a>(record: &'a Record, outer: &str, inner: &str) -> &'a str {
    record
        .get(outer)
        .and_then(|o| o.get(inner))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// Top three values of `key` across the catalog, e.g. `[openSource (4), ...]`.
fn summarize<'a>(catalog: &'a Catalog, key: impl Fn(&'a Record) -> &'a str) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in &catalog.releases {
        let value = key(record);
        let value = if value.is_empty() { "unknown" } else { value };
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(value, cnt)| format!("{} ({})", value, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}
