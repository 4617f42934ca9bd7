//! Markdown and JSON report generation.
//!
//! This module builds the document forms of the price and zone reports and
//! writes the categorization files.

use super::{format_price, zone_file_name};
use crate::analysis::{AgentPrices, AgentZones, Categorization, PriceOverview, ZoneLabels};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Generate the Markdown price report.
pub fn generate_price_markdown(overview: &PriceOverview, rows: &[&AgentPrices]) -> String {
    let mut output = String::new();

    output.push_str("# Agent Price Report\n\n");
    output.push_str(&generate_price_overview_section(overview));
    output.push_str(&generate_price_agents_section(rows));
    output.push_str(&generate_footer());

    output
}

fn generate_price_overview_section(overview: &PriceOverview) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str("| Metric | Value |\n");
    section.push_str("|:---|---:|\n");
    section.push_str(&format!("| Agents | {} |\n", overview.total_agents));
    section.push_str(&format!(
        "| Unique properties | {} |\n",
        overview.unique_properties
    ));
    section.push_str(&format!(
        "| Unique resale properties | {} |\n",
        overview.unique_resale_properties
    ));
    section.push_str(&format!(
        "| Unique rental properties | {} |\n",
        overview.unique_rental_properties
    ));
    section.push_str(&format!(
        "| Resale instances | {} |\n",
        overview.resale_instances
    ));
    section.push_str(&format!(
        "| Rental instances | {} |\n",
        overview.rental_instances
    ));
    section.push_str(&format!(
        "| Mean overall average | {} |\n\n",
        format_price(overview.average_overall_price)
    ));

    section
}

fn generate_price_agents_section(rows: &[&AgentPrices]) -> String {
    let mut section = String::new();

    section.push_str("## Agents\n\n");

    if rows.is_empty() {
        section.push_str("No agents match the current filters.\n\n");
        return section;
    }

    section.push_str(
        "| Agent | Name | FSM | Resale | Avg resale | Min | Max | Rental | Avg rent | Overall avg |\n",
    );
    section.push_str("|:---|:---|:---:|---:|---:|---:|---:|---:|---:|---:|\n");

    for row in rows {
        let stats = &row.stats;
        section.push_str(&format!(
            "| `{}` | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            row.agent_id,
            escape_cell(&row.name),
            if row.has_fsm_token { "✓" } else { "" },
            stats.resale.count,
            format_price(stats.resale.average_price),
            format_price(stats.resale.min_price),
            format_price(stats.resale.max_price),
            stats.rental.count,
            format_price(stats.rental.average_price),
            format_price(stats.overall.average_price),
        ));
    }
    section.push('\n');

    section
}

/// Generate the Markdown zone report.
pub fn generate_zone_markdown(rows: &[&AgentZones]) -> String {
    let mut output = String::new();

    output.push_str("# Agent Zone Report\n\n");
    output.push_str(&format!("*Agents: {}*\n\n", rows.len()));

    if rows.is_empty() {
        output.push_str("No agents match the current filters.\n\n");
    }

    for row in rows {
        output.push_str(&generate_agent_zone_section(row));
    }

    output.push_str(&generate_footer());
    output
}

fn generate_agent_zone_section(row: &AgentZones) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## {} (`{}`)\n\n",
        escape_cell(&row.name),
        row.agent_id
    ));
    section.push_str(&format!(
        "*Enquiries: {} | Inventories: {} | FSM token: {}*\n\n",
        row.total_enquiries,
        row.total_inventories,
        if row.has_fsm_token { "yes" } else { "no" }
    ));
    if !row.area_of_operation.is_empty() {
        section.push_str(&format!(
            "**Area of operation:** {}\n\n",
            row.area_of_operation.join(", ")
        ));
    }

    if row.breakdown.zones.is_empty() {
        section.push_str("No linked properties.\n\n");
        return section;
    }

    section.push_str("| Zone | Count | Share | Enquiries | Inventories |\n");
    section.push_str("|:---|---:|---:|---:|---:|\n");
    for (label, share) in &row.breakdown.zones {
        section.push_str(&format!(
            "| {} | {} | {:.2}% | {} | {} |\n",
            escape_cell(label),
            share.count,
            share.percentage,
            row.breakdown.enquiry_zones.get(label),
            row.breakdown.inventory_zones.get(label),
        ));
    }
    section.push('\n');

    section
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn generate_footer() -> String {
    "---\n\n*Report generated by acn-insights*\n".to_string()
}

#[derive(Serialize)]
struct PriceDocument<'a> {
    overview: &'a PriceOverview,
    agents: &'a [&'a AgentPrices],
}

#[derive(Serialize)]
struct ZoneDocument<'a> {
    agents: &'a [&'a AgentZones],
}

/// Generate the JSON price report: `{ overview, agents }`.
pub fn generate_price_json(overview: &PriceOverview, rows: &[&AgentPrices]) -> Result<String> {
    serde_json::to_string_pretty(&PriceDocument {
        overview,
        agents: rows,
    })
    .map_err(Into::into)
}

/// Generate the JSON zone report: `{ agents }`.
pub fn generate_zone_json(rows: &[&AgentZones]) -> Result<String> {
    serde_json::to_string_pretty(&ZoneDocument { agents: rows }).map_err(Into::into)
}

/// Generate a pretty-printed JSON document of any summary report.
pub fn generate_summary_json<T: Serialize>(summary: &T) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Write a rendered report to `path`, or to stdout when no path is given.
pub fn write_report(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Write one id file per bucket plus `summary.json` into `dir`.
///
/// Returns the paths written, bucket files first.
pub fn write_categorization(
    dir: &Path,
    categorization: &Categorization,
    labels: &ZoneLabels,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    for (bucket, ids) in categorization.buckets() {
        let path = dir.join(zone_file_name(&labels.bucket(bucket)));
        std::fs::write(&path, ids.join("\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {} ids to {}", ids.len(), path.display());
        written.push(path);
    }

    let summary_path = dir.join("summary.json");
    let summary = serde_json::to_string_pretty(&categorization.summary(labels))?;
    std::fs::write(&summary_path, summary)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;
    written.push(summary_path);

    Ok(written)
}
