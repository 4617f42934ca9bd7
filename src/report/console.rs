//! Plain-text views printed to the terminal.

use super::{format_price, truncate, zone_file_name};
use crate::analysis::{
    AgentPrices, AgentZones, Categorization, CoverageReport, ListingFilter, PriceOverview,
    RentCategory, RentalReport, ZoneLabels,
};
use std::path::Path;

const RULE_WIDTH: usize = 70;

fn banner(title: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("{}\n{}\n{}\n", rule, title, rule)
}

/// Totals, bucket sizes and an id preview for the categorize command.
///
/// `files_dir` is the directory the bucket files were written to, if any.
pub fn render_categorization(
    categorization: &Categorization,
    labels: &ZoneLabels,
    files_dir: Option<&Path>,
    preview_limit: usize,
) -> String {
    let mut out = String::new();

    out.push_str(&banner("AGENT ZONE CATEGORIZATION"));
    out.push('\n');
    out.push_str(&format!(
        "Total agents with FSM token: {}\n",
        categorization.total_with_fsm_token
    ));
    out.push_str(&format!(
        "Categorized using enquiry/property data: {}\n",
        categorization.by_property_zones
    ));
    out.push_str(&format!(
        "Categorized using area of operation: {}\n\n",
        categorization.by_area_of_operation
    ));

    for (bucket, ids) in categorization.buckets() {
        let label = labels.bucket(bucket);
        out.push_str(&format!("{}: {} agents\n", label, ids.len()));
        if files_dir.is_some() {
            out.push_str(&format!("  File: {}\n", zone_file_name(&label)));
        }
    }

    if let Some(dir) = files_dir {
        out.push_str(&format!(
            "\nFiles and summary.json written to: {}\n",
            dir.display()
        ));
    }

    if preview_limit == 0 {
        return out;
    }

    out.push('\n');
    out.push_str(&banner(&format!(
        "PREVIEW (first {} agents from each zone)",
        preview_limit
    )));
    out.push('\n');

    for (bucket, ids) in categorization.buckets() {
        if ids.is_empty() {
            continue;
        }
        out.push_str(&format!("{}:\n", labels.bucket(bucket)));
        for id in ids.iter().take(preview_limit) {
            out.push_str(&format!("  {}\n", id));
        }
        if ids.len() > preview_limit {
            out.push_str(&format!("  ... and {} more\n", ids.len() - preview_limit));
        }
        out.push('\n');
    }

    out
}

pub fn render_coverage(report: &CoverageReport) -> String {
    let mut out = String::new();

    out.push_str(&banner("PROPERTY COVERAGE"));
    out.push_str("\nPROPERTIES IN SNAPSHOT:\n");
    out.push_str(&format!("Total Resale Properties: {}\n", report.resale.total));
    out.push_str(&format!("  - With Price: {}\n", report.resale.with_price));
    out.push_str(&format!("  - Without Price: {}\n", report.resale.without_price));
    out.push_str(&format!("Total Rental Properties: {}\n", report.rental.total));
    out.push_str(&format!("  - With Rent: {}\n", report.rental.with_price));
    out.push_str(&format!("  - Without Rent: {}\n\n", report.rental.without_price));

    out.push_str("PROPERTIES USED BY AGENTS (with valid prices):\n");
    for (title, usage) in [("Resale", &report.agent_resale), ("Rental", &report.agent_rental)] {
        out.push_str(&format!(
            "Total {}: {} (from {} unique properties)\n",
            title, usage.instances, usage.unique_properties
        ));
        out.push_str(&format!("  - From Enquiries: {}\n", usage.via_enquiries));
        out.push_str(&format!("  - From Inventories: {}\n", usage.via_inventories));
    }
    out.push('\n');

    out.push_str(&banner("NOT USED BY ANY AGENT"));
    out.push_str(&format!(
        "Resale: {} priced properties\n",
        report.agent_resale.unused_properties
    ));
    out.push_str(&format!(
        "Rental: {} priced properties\n",
        report.agent_rental.unused_properties
    ));

    out
}

pub fn render_rentals(report: &RentalReport) -> String {
    let mut out = String::new();

    out.push_str(&banner("RENTAL PROPERTIES DEEP DIVE"));
    out.push_str(&format!("\nTotal Rental Properties: {}\n", report.total_rentals));
    for category in RentCategory::ALL {
        out.push_str(&format!("  - {}: {}\n", category, report.count(category)));
    }

    out.push_str("\nEXAMPLES:\n");
    for category in RentCategory::ALL {
        if let Some(entry) = report.category(category).filter(|c| !c.examples.is_empty()) {
            out.push_str(&format!("  {}: {}\n", category, entry.examples.join(", ")));
        }
    }

    let linked = &report.linked;
    out.push_str("\nRENTAL PROPERTIES LINKED TO AGENTS:\n");
    out.push_str(&format!("In enquiries: {}\n", linked.in_enquiries.len()));
    out.push_str(&format!("In inventories: {}\n", linked.in_inventories.len()));
    out.push_str(&format!(
        "Unique (enquiries + inventories): {}\n",
        linked.total_linked
    ));
    out.push_str(&format!("With valid rent: {}\n\n", linked.with_valid_rent));

    out.push_str(&banner("CONCLUSION"));
    out.push_str(&format!(
        "{} of {} rentals have a usable rent\n",
        report.valid(),
        report.total_rentals
    ));
    out.push_str(&format!(
        "{} rentals are not linked to any agent\n",
        report.unlinked
    ));
    out.push_str(&format!(
        "{} linked rentals have no valid rent\n",
        report.linked_without_rent
    ));

    out
}

/// Overview block plus one row per agent.
pub fn render_price_table(
    overview: &PriceOverview,
    rows: &[&AgentPrices],
    listing: ListingFilter,
) -> String {
    let mut out = String::new();

    out.push_str(&banner("AGENT PRICE ANALYTICS"));
    out.push_str(&format!(
        "Agents shown:            {}\n",
        overview.total_agents
    ));
    out.push_str(&format!(
        "Unique properties:       {} ({} resale, {} rental)\n",
        overview.unique_properties,
        overview.unique_resale_properties,
        overview.unique_rental_properties
    ));
    out.push_str(&format!(
        "Instances in view:       {} resale, {} rental\n",
        overview.resale_instances, overview.rental_instances
    ));
    out.push_str(&format!(
        "Mean overall average:    {}\n\n",
        format_price(overview.average_overall_price)
    ));

    out.push_str(&format!(
        "{:<10} {:<22} {:>3} {:>6} {:>14} {:>6} {:>14} {:>14}\n",
        "AGENT", "NAME", "FSM", "RESALE", "AVG RESALE", "RENTAL", "AVG RENT", "AVG"
    ));
    out.push_str(&format!("{}\n", "-".repeat(96)));

    for row in rows {
        let stats = &row.stats;
        out.push_str(&format!(
            "{:<10} {:<22} {:>3} {:>6} {:>14} {:>6} {:>14} {:>14}\n",
            truncate(&row.agent_id, 10),
            truncate(&row.name, 22),
            if row.has_fsm_token { "yes" } else { "no" },
            stats.resale.count,
            price_cell(stats.resale.count, stats.resale.average_price),
            stats.rental.count,
            price_cell(stats.rental.count, stats.rental.average_price),
            price_cell(stats.overall.count, stats.average_for(listing)),
        ));
    }

    if rows.is_empty() {
        out.push_str("No agents match the current filters.\n");
    }

    out
}

fn price_cell(count: usize, price: f64) -> String {
    if count == 0 {
        "-".to_string()
    } else {
        format_price(price)
    }
}

/// One block per agent with its zone shares.
pub fn render_zone_table(rows: &[&AgentZones]) -> String {
    let mut out = String::new();

    out.push_str(&banner("AGENT ZONE ANALYTICS"));
    out.push_str(&format!("Agents shown: {}\n\n", rows.len()));

    for row in rows {
        out.push_str(&format!(
            "{} {} [{} enquiries, {} inventories{}]\n",
            row.agent_id,
            row.name,
            row.total_enquiries,
            row.total_inventories,
            if row.has_fsm_token { ", FSM" } else { "" }
        ));
        if !row.area_of_operation.is_empty() {
            out.push_str(&format!("  Area: {}\n", row.area_of_operation.join(", ")));
        }
        if row.breakdown.zones.is_empty() {
            out.push_str("  No linked properties\n");
        }
        for (label, share) in &row.breakdown.zones {
            out.push_str(&format!(
                "  {:<28} {:>5} {:>7.2}%\n",
                label, share.count, share.percentage
            ));
        }
        out.push('\n');
    }

    if rows.is_empty() {
        out.push_str("No agents match the current filters.\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::categorize::{Assignment, Basis};
    use crate::analysis::histogram::Histogram;
    use crate::analysis::zone::{Bucket, Zone};
    use crate::analysis::{analyze_coverage, analyze_prices, analyze_rentals, analyze_zones, Linker};
    use crate::config::LinkerConfig;
    use crate::snapshot::snapshot_from_json;
    use serde_json::json;

    fn assignment(bucket: Bucket) -> Assignment {
        Assignment {
            bucket,
            basis: Basis::AreaOfOperation,
            zone_counts: Histogram::new(),
        }
    }

    #[test]
    fn test_render_categorization_preview() {
        let mut categorization = Categorization::default();
        for id in ["A1", "A2", "A3"] {
            categorization.record(id, &assignment(Bucket::Zone(Zone::North)));
        }
        categorization.record("A4", &assignment(Bucket::Pan));

        let text = render_categorization(
            &categorization,
            &ZoneLabels::default(),
            Some(Path::new("out")),
            2,
        );

        assert!(text.contains("Total agents with FSM token: 4"));
        assert!(text.contains("North Bangalore: 3 agents"));
        assert!(text.contains("  File: north_bangalore.txt"));
        assert!(text.contains("West Bangalore: 0 agents"));
        assert!(text.contains("  ... and 1 more"));
        assert!(text.contains("PAN Bangalore:\n  A4\n"));
        assert!(!text.contains("West Bangalore:\n"));
    }

    #[test]
    fn test_render_categorization_without_files() {
        let text = render_categorization(
            &Categorization::default(),
            &ZoneLabels::default(),
            None,
            5,
        );
        assert!(!text.contains("File:"));
        assert!(text.contains("Total agents with FSM token: 0"));
    }

    #[test]
    fn test_render_price_table() {
        let snapshot = snapshot_from_json(
            json!({ "A1": { "name": "Ravi", "myInventories": ["P1"] } }),
            json!({}),
            json!({ "P1": { "listingType": "resale", "totalAskPrice": 25000000 } }),
        );
        let analysis = analyze_prices(&Linker::new(&snapshot, &LinkerConfig::default()));
        let rows: Vec<&AgentPrices> = analysis.agents.iter().collect();
        let overview = PriceOverview::new(&analysis, &rows);

        let text = render_price_table(&overview, &rows, ListingFilter::All);
        assert!(text.contains("Ravi"));
        assert!(text.contains("₹2.50 Cr"));
        assert!(text.contains("Agents shown:            1"));

        let empty = render_price_table(&PriceOverview::default(), &[], ListingFilter::All);
        assert!(empty.contains("No agents match"));
    }

    #[test]
    fn test_render_zone_table() {
        let snapshot = snapshot_from_json(
            json!({ "A1": { "name": "Ravi", "fsmToken": ["t"], "myInventories": ["P1"] } }),
            json!({}),
            json!({ "P1": { "zone": "north" } }),
        );
        let rows = analyze_zones(
            &Linker::new(&snapshot, &LinkerConfig::default()),
            &ZoneLabels::default(),
        );
        let view: Vec<&AgentZones> = rows.iter().collect();

        let text = render_zone_table(&view);
        assert!(text.contains("A1 Ravi [0 enquiries, 1 inventories, FSM]"));
        assert!(text.contains("North Bangalore"));
        assert!(text.contains("100.00%"));
    }

    #[test]
    fn test_render_coverage_and_rentals() {
        let snapshot = snapshot_from_json(
            json!({ "A1": { "myInventories": ["P1"] } }),
            json!({}),
            json!({
                "P1": { "listingType": "rental", "rentalInfo": { "rent": 12000 } },
                "P2": { "listingType": "rental", "rentalInfo": { "rent": null } }
            }),
        );
        let linker = Linker::new(&snapshot, &LinkerConfig::default());

        let coverage = render_coverage(&analyze_coverage(&linker));
        assert!(coverage.contains("Total Rental Properties: 2"));
        assert!(coverage.contains("  - With Rent: 1"));
        assert!(coverage.contains("Total Rental: 1 (from 1 unique properties)"));

        let rentals = render_rentals(&analyze_rentals(&linker, 3));
        assert!(rentals.contains("  - rent is null: 1"));
        assert!(rentals.contains("  rent is null: P2"));
        assert!(rentals.contains("1 rentals are not linked to any agent"));
    }
}
