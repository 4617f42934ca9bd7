//! Per-agent zone distribution.

use super::histogram::{serialize_ordered, Histogram};
use super::linker::{LinkPath, LinkedProperty, Linker};
use super::zone::ZoneLabels;
use super::{percentage, AgentQuery};
use serde::Serialize;

/// Count and share of one zone label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneShare {
    pub count: usize,
    pub percentage: f64,
}

/// Zone histogram of an agent's linked properties.
///
/// Properties without a zone count under the "no zone" label, so the
/// percentages of an agent with any linked property add up to 100.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBreakdown {
    #[serde(serialize_with = "serialize_ordered")]
    pub zones: Vec<(String, ZoneShare)>,
    pub enquiry_zones: Histogram<String>,
    pub inventory_zones: Histogram<String>,
}

impl ZoneBreakdown {
    pub fn from_links(links: &[LinkedProperty<'_>], labels: &ZoneLabels) -> Self {
        let mut combined = Histogram::new();
        let mut enquiry_zones = Histogram::new();
        let mut inventory_zones = Histogram::new();

        for link in links {
            let label = labels.normalize(link.property.zone());
            combined.add(label.clone());
            match link.path {
                LinkPath::Enquiry => enquiry_zones.add(label),
                LinkPath::Inventory => inventory_zones.add(label),
            }
        }

        let total = combined.total();
        let zones = combined
            .iter()
            .map(|(label, count)| {
                (
                    label.clone(),
                    ZoneShare {
                        count,
                        percentage: percentage(count, total),
                    },
                )
            })
            .collect();

        Self {
            zones,
            enquiry_zones,
            inventory_zones,
        }
    }

    /// Number of linked properties counted.
    #[cfg(test)]
    pub fn total(&self) -> usize {
        self.zones.iter().map(|(_, share)| share.count).sum()
    }

    #[cfg(test)]
    pub fn share(&self, label: &str) -> Option<&ZoneShare> {
        self.zones
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, share)| share)
    }
}

/// One agent's row in the zone report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentZones {
    pub agent_id: String,
    pub name: String,
    pub phone_number: String,
    pub has_fsm_token: bool,
    pub total_enquiries: usize,
    pub total_inventories: usize,
    pub area_of_operation: Vec<String>,
    #[serde(flatten)]
    pub breakdown: ZoneBreakdown,
}

pub fn analyze_zones(linker: &Linker<'_>, labels: &ZoneLabels) -> Vec<AgentZones> {
    linker
        .snapshot()
        .agents
        .iter()
        .map(|(agent_id, agent)| {
            let links = linker.link(agent);
            AgentZones {
                agent_id: agent_id.clone(),
                name: agent.display_name(agent_id).to_string(),
                phone_number: agent.display_phone().to_string(),
                has_fsm_token: agent.has_fsm_token(),
                total_enquiries: agent.enquiry_did.len(),
                total_inventories: agent.my_inventories.len(),
                area_of_operation: agent.area_of_operation.clone(),
                breakdown: ZoneBreakdown::from_links(&links.properties, labels),
            }
        })
        .collect()
}

/// Row ordering of the zone report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ZoneSort {
    /// Most enquiries first
    #[default]
    Enquiries,
    /// Most inventories first
    Inventories,
    /// Name, A to Z
    Name,
}

pub fn select_zone_rows<'a>(
    rows: &'a [AgentZones],
    query: &AgentQuery,
    sort: ZoneSort,
) -> Vec<&'a AgentZones> {
    let mut selected: Vec<&AgentZones> = rows
        .iter()
        .filter(|row| query.matches(&row.agent_id, &row.name, row.has_fsm_token))
        .collect();

    match sort {
        ZoneSort::Enquiries => selected.sort_by(|a, b| b.total_enquiries.cmp(&a.total_enquiries)),
        ZoneSort::Inventories => {
            selected.sort_by(|a, b| b.total_inventories.cmp(&a.total_inventories))
        }
        ZoneSort::Name => selected.sort_by_key(|row| row.name.to_lowercase()),
    }

    selected
}
