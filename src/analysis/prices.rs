//! Per-agent price statistics.
//!
//! Every linked property with a valid price contributes one instance to its
//! listing type. Agents without any valid price are kept with zeroed
//! statistics; filtering happens later, in [`select_price_rows`].

use super::linker::{LinkDiagnostics, LinkedProperty, Linker};
use super::AgentQuery;
use crate::models::ListingType;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Statistics over the valid prices of one listing type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingStats {
    pub count: usize,
    pub total_price: f64,
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

impl ListingStats {
    /// Fold prices left to right. An empty slice yields all zeros.
    pub fn from_prices(prices: &[f64]) -> Self {
        if prices.is_empty() {
            return Self::default();
        }

        let total = prices.iter().fold(0.0, |acc, price| acc + price);
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            count: prices.len(),
            total_price: total,
            average_price: total / prices.len() as f64,
            min_price: min,
            max_price: max,
        }
    }
}

/// Resale and rental combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub count: usize,
    pub average_price: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceStats {
    pub resale: ListingStats,
    pub rental: ListingStats,
    pub overall: OverallStats,
}

impl PriceStats {
    pub fn from_links(links: &[LinkedProperty<'_>]) -> Self {
        let mut resale_prices = Vec::new();
        let mut rental_prices = Vec::new();

        for link in links {
            match link.property.listing_price() {
                Some((ListingType::Resale, status)) => resale_prices.extend(status.amount()),
                Some((ListingType::Rental, status)) => rental_prices.extend(status.amount()),
                _ => {}
            }
        }

        let resale = ListingStats::from_prices(&resale_prices);
        let rental = ListingStats::from_prices(&rental_prices);

        let count = resale.count + rental.count;
        let average_price = if count > 0 {
            (resale.total_price + rental.total_price) / count as f64
        } else {
            0.0
        };

        Self {
            resale,
            rental,
            overall: OverallStats {
                count,
                average_price,
            },
        }
    }

    /// Average for the listing filter in use.
    pub fn average_for(&self, listing: ListingFilter) -> f64 {
        match listing {
            ListingFilter::All => self.overall.average_price,
            ListingFilter::Resale => self.resale.average_price,
            ListingFilter::Rental => self.rental.average_price,
        }
    }
}

/// One agent's row in the price report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPrices {
    pub agent_id: String,
    pub name: String,
    pub phone_number: String,
    pub has_fsm_token: bool,
    pub total_enquiries: usize,
    pub total_inventories: usize,
    #[serde(flatten)]
    pub stats: PriceStats,
}

/// Price statistics for every agent in the snapshot.
#[derive(Debug, Clone, Default)]
pub struct PriceAnalysis {
    pub agents: Vec<AgentPrices>,
    /// Valid-priced resale properties used by at least one agent.
    pub unique_resale: BTreeSet<String>,
    /// Valid-priced rental properties used by at least one agent.
    pub unique_rental: BTreeSet<String>,
    pub diagnostics: LinkDiagnostics,
}

pub fn analyze_prices(linker: &Linker<'_>) -> PriceAnalysis {
    let mut analysis = PriceAnalysis::default();

    for (agent_id, agent) in &linker.snapshot().agents {
        let links = linker.link(agent);
        analysis.diagnostics.merge(&links.diagnostics);

        for link in &links.properties {
            match link.property.listing_price() {
                Some((ListingType::Resale, status)) if status.is_valid() => {
                    analysis.unique_resale.insert(link.property_id.to_string());
                }
                Some((ListingType::Rental, status)) if status.is_valid() => {
                    analysis.unique_rental.insert(link.property_id.to_string());
                }
                _ => {}
            }
        }

        analysis.agents.push(AgentPrices {
            agent_id: agent_id.clone(),
            name: agent.display_name(agent_id).to_string(),
            phone_number: agent.display_phone().to_string(),
            has_fsm_token: agent.has_fsm_token(),
            total_enquiries: agent.enquiry_did.len(),
            total_inventories: agent.my_inventories.len(),
            stats: PriceStats::from_links(&links.properties),
        });
    }

    debug!(
        "Price analysis: {} agents, {} unique resale, {} unique rental, {} unresolved references",
        analysis.agents.len(),
        analysis.unique_resale.len(),
        analysis.unique_rental.len(),
        analysis.diagnostics.unresolved()
    );

    analysis
}

/// Listing types an agent must have priced data for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ListingFilter {
    #[default]
    All,
    Resale,
    Rental,
}

/// Ordering inside each listing group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PriceSort {
    /// Highest average price first
    #[default]
    AvgPrice,
    /// Name, A to Z
    Name,
    /// Most enquiries first
    Enquiries,
}

/// Agents with resale data first, then rental-only, then none.
fn listing_group(stats: &PriceStats) -> u8 {
    if stats.resale.count > 0 {
        0
    } else if stats.rental.count > 0 {
        1
    } else {
        2
    }
}

/// Filter and order price rows for display.
pub fn select_price_rows<'a>(
    rows: &'a [AgentPrices],
    query: &AgentQuery,
    listing: ListingFilter,
    sort: PriceSort,
) -> Vec<&'a AgentPrices> {
    let mut selected: Vec<&AgentPrices> = rows
        .iter()
        .filter(|row| query.matches(&row.agent_id, &row.name, row.has_fsm_token))
        .filter(|row| match listing {
            ListingFilter::All => true,
            ListingFilter::Resale => row.stats.resale.count > 0,
            ListingFilter::Rental => row.stats.rental.count > 0,
        })
        .collect();

    selected.sort_by(|a, b| {
        listing_group(&a.stats)
            .cmp(&listing_group(&b.stats))
            .then_with(|| match sort {
                PriceSort::AvgPrice => b
                    .stats
                    .average_for(listing)
                    .total_cmp(&a.stats.average_for(listing)),
                PriceSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                PriceSort::Enquiries => b.total_enquiries.cmp(&a.total_enquiries),
            })
    });

    selected
}

/// Headline figures for a filtered view of the price report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceOverview {
    pub total_agents: usize,
    pub unique_resale_properties: usize,
    pub unique_rental_properties: usize,
    pub unique_properties: usize,
    pub resale_instances: usize,
    pub rental_instances: usize,
    /// Mean of the agents' overall average price.
    pub average_overall_price: f64,
}

impl PriceOverview {
    /// Unique counts cover all agents; instance counts and the average cover `rows` only.
    pub fn new(analysis: &PriceAnalysis, rows: &[&AgentPrices]) -> Self {
        let average_overall_price = if rows.is_empty() {
            0.0
        } else {
            rows.iter()
                .fold(0.0, |acc, row| acc + row.stats.overall.average_price)
                / rows.len() as f64
        };

        Self {
            total_agents: rows.len(),
            unique_resale_properties: analysis.unique_resale.len(),
            unique_rental_properties: analysis.unique_rental.len(),
            unique_properties: analysis.unique_resale.len() + analysis.unique_rental.len(),
            resale_instances: rows.iter().map(|row| row.stats.resale.count).sum(),
            rental_instances: rows.iter().map(|row| row.stats.rental.count).sum(),
            average_overall_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkerConfig;
    use crate::snapshot::snapshot_from_json;
    use serde_json::json;

    fn row(id: &str, name: &str, resale: &[f64], rental: &[f64], enquiries: usize) -> AgentPrices {
        let resale = ListingStats::from_prices(resale);
        let rental = ListingStats::from_prices(rental);
        let count = resale.count + rental.count;
        AgentPrices {
            agent_id: id.to_string(),
            name: name.to_string(),
            phone_number: String::new(),
            has_fsm_token: id.starts_with("F"),
            total_enquiries: enquiries,
            total_inventories: 0,
            stats: PriceStats {
                resale,
                rental,
                overall: OverallStats {
                    count,
                    average_price: if count > 0 {
                        (resale.total_price + rental.total_price) / count as f64
                    } else {
                        0.0
                    },
                },
            },
        }
    }

    #[test]
    fn test_listing_stats() {
        let stats = ListingStats::from_prices(&[300.0, 100.0, 200.0]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_price, 600.0);
        assert_eq!(stats.average_price, 200.0);
        assert_eq!(stats.min_price, 100.0);
        assert_eq!(stats.max_price, 300.0);

        assert_eq!(ListingStats::from_prices(&[]), ListingStats::default());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let snapshot = snapshot_from_json(
            json!({ "A1": { "enquiryDid": ["E1"], "myInventories": ["P2"] } }),
            json!({ "E1": { "propertyId": "P1" } }),
            json!({
                "P1": { "listingType": "resale", "pricing": { "totalAskPrice": 5000000 } },
                "P2": { "listingType": "rental", "rentalInfo": { "rent": 20000 } }
            }),
        );
        let linker = Linker::new(&snapshot, &LinkerConfig::default());
        let analysis = analyze_prices(&linker);
        let stats = analysis.agents[0].stats;

        assert_eq!(
            stats.resale,
            ListingStats {
                count: 1,
                total_price: 5000000.0,
                average_price: 5000000.0,
                min_price: 5000000.0,
                max_price: 5000000.0,
            }
        );
        assert_eq!(
            stats.rental,
            ListingStats {
                count: 1,
                total_price: 20000.0,
                average_price: 20000.0,
                min_price: 20000.0,
                max_price: 20000.0,
            }
        );
        assert_eq!(stats.overall.count, 2);
        assert_eq!(stats.overall.average_price, 2510000.0);
    }

    #[test]
    fn test_invalid_prices_are_excluded() {
        let snapshot = snapshot_from_json(
            json!({ "A1": { "myInventories": ["P1", "P2", "P3", "P4", "P5"] } }),
            json!({}),
            json!({
                "P1": { "listingType": "resale", "pricing": { "totalAskPrice": 0 } },
                "P2": { "listingType": "resale", "pricing": { "totalAskPrice": -10 } },
                "P3": { "listingType": "rental", "rentalInfo": { "rent": null } },
                "P4": { "listingType": "rental" },
                "P5": { "listingType": "plot", "totalAskPrice": 999 }
            }),
        );
        let linker = Linker::new(&snapshot, &LinkerConfig::default());
        let analysis = analyze_prices(&linker);
        let stats = analysis.agents[0].stats;

        assert_eq!(stats.resale, ListingStats::default());
        assert_eq!(stats.rental, ListingStats::default());
        assert_eq!(stats.overall.count, 0);
        assert_eq!(stats.overall.average_price, 0.0);
        assert!(analysis.unique_resale.is_empty());
    }

    #[test]
    fn test_agents_without_prices_are_kept() {
        let snapshot = snapshot_from_json(json!({ "A1": {}, "A2": {} }), json!({}), json!({}));
        let linker = Linker::new(&snapshot, &LinkerConfig::default());
        let analysis = analyze_prices(&linker);

        assert_eq!(analysis.agents.len(), 2);
        for agent in &analysis.agents {
            assert_eq!(
                agent.stats.resale.count + agent.stats.rental.count,
                agent.stats.overall.count
            );
            assert_eq!(agent.stats.overall.average_price, 0.0);
        }
    }

    #[test]
    fn test_unique_properties_across_agents() {
        let snapshot = snapshot_from_json(
            json!({
                "A1": { "enquiryDid": ["E1"], "myInventories": ["P1"] },
                "A2": { "myInventories": ["P1"] }
            }),
            json!({ "E1": { "propertyId": "P1" } }),
            json!({ "P1": { "listingType": "resale", "totalAskPrice": 100 } }),
        );
        let linker = Linker::new(&snapshot, &LinkerConfig::default());
        let analysis = analyze_prices(&linker);

        assert_eq!(analysis.agents[0].stats.resale.count, 2);
        assert_eq!(analysis.agents[1].stats.resale.count, 1);
        assert_eq!(analysis.unique_resale.len(), 1);
    }

    #[test]
    fn test_select_groups_then_sorts() {
        let rows = vec![
            row("A1", "Zed", &[], &[], 9),
            row("A2", "Amy", &[], &[15000.0], 1),
            row("A3", "Bob", &[100.0], &[], 2),
            row("A4", "Cal", &[900.0], &[], 3),
        ];

        let query = AgentQuery::default();

        let by_price = select_price_rows(&rows, &query, ListingFilter::All, PriceSort::AvgPrice);
        let ids: Vec<_> = by_price.iter().map(|r| r.agent_id.as_str()).collect();
        assert_eq!(ids, vec!["A4", "A3", "A2", "A1"]);

        let by_name = select_price_rows(&rows, &query, ListingFilter::All, PriceSort::Name);
        let ids: Vec<_> = by_name.iter().map(|r| r.agent_id.as_str()).collect();
        assert_eq!(ids, vec!["A3", "A4", "A2", "A1"]);

        let rentals = select_price_rows(&rows, &query, ListingFilter::Rental, PriceSort::AvgPrice);
        assert_eq!(rentals.len(), 1);
        assert_eq!(rentals[0].agent_id, "A2");
    }

    #[test]
    fn test_select_with_query() {
        let rows = vec![
            row("F1", "Asha", &[100.0], &[], 0),
            row("A2", "Asha K", &[], &[], 0),
        ];

        let query = AgentQuery {
            search: Some("asha".to_string()),
            fsm_only: true,
        };
        let selected = select_price_rows(&rows, &query, ListingFilter::All, PriceSort::Name);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].agent_id, "F1");
    }

    #[test]
    fn test_overview() {
        let rows = vec![
            row("A1", "One", &[100.0, 300.0], &[], 0),
            row("A2", "Two", &[], &[50.0], 0),
            row("A3", "Three", &[], &[], 0),
        ];
        let mut analysis = PriceAnalysis::default();
        analysis.unique_resale.insert("P1".to_string());
        analysis.unique_rental.insert("P2".to_string());

        let view: Vec<&AgentPrices> = rows.iter().collect();
        let overview = PriceOverview::new(&analysis, &view);

        assert_eq!(overview.total_agents, 3);
        assert_eq!(overview.unique_properties, 2);
        assert_eq!(overview.resale_instances, 2);
        assert_eq!(overview.rental_instances, 1);
        assert_eq!(overview.average_overall_price, (200.0 + 50.0 + 0.0) / 3.0);

        assert_eq!(PriceOverview::new(&analysis, &[]).average_overall_price, 0.0);
    }
}
