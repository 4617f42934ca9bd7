//! Primary-zone categorization of FSM token holders.
//!
//! Each eligible agent lands in exactly one bucket. The zones of its linked
//! properties decide first; when none of them carries a directional zone,
//! the agent's declared area of operation decides, defaulting to the
//! pan-regional bucket.

use super::histogram::{serialize_ordered, Histogram};
use super::linker::{LinkedProperty, Linker};
use super::percentage;
use super::zone::{match_direction, Bucket, Zone, ZoneLabels};
use crate::models::Agent;
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::debug;

/// What decided an agent's bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    PropertyZones,
    AreaOfOperation,
}

/// Bucket chosen for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub bucket: Bucket,
    pub basis: Basis,
    /// Directional zones of the linked properties, in first-seen order.
    pub zone_counts: Histogram<Zone>,
}

/// Pick the primary zone of one agent.
///
/// Ties between equally frequent zones go to the zone seen first (enquiry
/// path before inventories, each in list order).
pub fn assign_primary_zone(agent: &Agent, links: &[LinkedProperty<'_>]) -> Assignment {
    let mut zone_counts = Histogram::new();
    for link in links {
        if let Some(zone) = link.property.zone().and_then(match_direction) {
            zone_counts.add(zone);
        }
    }

    match zone_counts.mode().map(|(zone, _)| *zone) {
        Some(zone) => Assignment {
            bucket: Bucket::Zone(zone),
            basis: Basis::PropertyZones,
            zone_counts,
        },
        None => Assignment {
            bucket: bucket_from_area(&agent.area_of_operation),
            basis: Basis::AreaOfOperation,
            zone_counts,
        },
    }
}

/// Bucket from a declared area of operation.
///
/// Only a single area naming a recognizable direction narrows the bucket;
/// no areas, several areas, or any area mentioning "pan" mean pan-regional.
pub fn bucket_from_area(areas: &[String]) -> Bucket {
    match areas {
        [area] if !area.to_lowercase().contains("pan") => match_direction(area)
            .map(Bucket::Zone)
            .unwrap_or(Bucket::Pan),
        _ => Bucket::Pan,
    }
}

/// Agent ids per bucket plus how they were decided.
#[derive(Debug, Clone)]
pub struct Categorization {
    buckets: Vec<(Bucket, Vec<String>)>,
    pub total_with_fsm_token: usize,
    pub by_property_zones: usize,
    pub by_area_of_operation: usize,
}

impl Default for Categorization {
    fn default() -> Self {
        Self {
            buckets: Bucket::ALL.iter().map(|b| (*b, Vec::new())).collect(),
            total_with_fsm_token: 0,
            by_property_zones: 0,
            by_area_of_operation: 0,
        }
    }
}

impl Categorization {
    pub fn record(&mut self, agent_id: &str, assignment: &Assignment) {
        self.total_with_fsm_token += 1;
        match assignment.basis {
            Basis::PropertyZones => self.by_property_zones += 1,
            Basis::AreaOfOperation => self.by_area_of_operation += 1,
        }

        if let Some((_, ids)) = self
            .buckets
            .iter_mut()
            .find(|(bucket, _)| *bucket == assignment.bucket)
        {
            ids.push(agent_id.to_string());
        }
    }

    /// Buckets in fixed order: North, South, East, West, Central, PAN.
    pub fn buckets(&self) -> impl Iterator<Item = (Bucket, &[String])> {
        self.buckets.iter().map(|(bucket, ids)| (*bucket, ids.as_slice()))
    }

    #[cfg(test)]
    pub fn agents_in(&self, bucket: Bucket) -> &[String] {
        self.buckets
            .iter()
            .find(|(b, _)| *b == bucket)
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn summary(&self, labels: &ZoneLabels) -> CategorySummary {
        CategorySummary {
            total_agents_with_fsm_token: self.total_with_fsm_token,
            categorized_using_enquiry_property_data: self.by_property_zones,
            categorized_using_area_of_operation: self.by_area_of_operation,
            breakdown: self
                .buckets()
                .map(|(bucket, ids)| {
                    (
                        labels.bucket(bucket),
                        BucketShare {
                            count: ids.len(),
                            percentage: format_share(ids.len(), self.total_with_fsm_token),
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Categorize every FSM token holder in the snapshot.
pub fn categorize_agents(linker: &Linker<'_>, progress: &ProgressBar) -> Categorization {
    let agents = &linker.snapshot().agents;
    progress.set_length(agents.len() as u64);

    let mut categorization = Categorization::default();
    for (agent_id, agent) in agents {
        progress.inc(1);
        if !agent.has_fsm_token() {
            continue;
        }

        let links = linker.link(agent);
        let assignment = assign_primary_zone(agent, &links.properties);
        debug!(
            "{} -> {:?} ({:?}, {} linked, {} unresolved)",
            agent_id,
            assignment.bucket,
            assignment.basis,
            links.properties.len(),
            links.diagnostics.unresolved()
        );
        categorization.record(agent_id, &assignment);
    }

    categorization
}

/// Count and formatted share of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketShare {
    pub count: usize,
    pub percentage: String,
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub total_agents_with_fsm_token: usize,
    pub categorized_using_enquiry_property_data: usize,
    pub categorized_using_area_of_operation: usize,
    #[serde(serialize_with = "serialize_ordered")]
    pub breakdown: Vec<(String, BucketShare)>,
}

/// "33.33%"; a zero total gives "0.00%". Halves round up, so 1/32 is "3.13%".
pub fn format_share(count: usize, total: usize) -> String {
    let hundredths = (percentage(count, total) * 100.0).round();
    format!("{:.2}%", hundredths / 100.0)
}
