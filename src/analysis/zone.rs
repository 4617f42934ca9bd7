//! Zone normalization.
//!
//! Free-text zone strings are matched against a fixed, ordered list of
//! directional tokens. The same rules back the per-agent zone histograms
//! and the primary-zone classifier.

use crate::config::ZoneConfig;
use std::fmt;

/// One of the five directional zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    North,
    South,
    East,
    West,
    Central,
}

impl Zone {
    pub fn name(self) -> &'static str {
        match self {
            Zone::North => "North",
            Zone::South => "South",
            Zone::East => "East",
            Zone::West => "West",
            Zone::Central => "Central",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Substring rules, checked in order; the first match wins.
const DIRECTION_RULES: [(&str, Zone); 5] = [
    ("north", Zone::North),
    ("south", Zone::South),
    ("east", Zone::East),
    ("west", Zone::West),
    ("central", Zone::Central),
];

/// Match a free-text zone against the directional rules (case-insensitive, trimmed).
pub fn match_direction(raw: &str) -> Option<Zone> {
    let needle = raw.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    DIRECTION_RULES
        .iter()
        .find(|(token, _)| needle.contains(token))
        .map(|(_, zone)| *zone)
}

/// Normalized zone of a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneLabel {
    Direction(Zone),
    /// No zone string, or only whitespace.
    NoZoneData,
    /// Non-empty text that matches no rule, kept verbatim.
    Unrecognized(String),
}

pub fn normalize_zone(raw: Option<&str>) -> ZoneLabel {
    match raw {
        Some(text) if !text.trim().is_empty() => match match_direction(text) {
            Some(zone) => ZoneLabel::Direction(zone),
            None => ZoneLabel::Unrecognized(text.to_string()),
        },
        _ => ZoneLabel::NoZoneData,
    }
}

/// Bucket of the primary-zone classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Zone(Zone),
    /// Pan-regional: the agent works across zones, or nothing narrower is known.
    Pan,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::Zone(Zone::North),
        Bucket::Zone(Zone::South),
        Bucket::Zone(Zone::East),
        Bucket::Zone(Zone::West),
        Bucket::Zone(Zone::Central),
        Bucket::Pan,
    ];
}

/// Renders zones and buckets with the deployment's locale qualifier.
#[derive(Debug, Clone)]
pub struct ZoneLabels {
    qualifier: String,
    pan_label: String,
    no_zone_label: String,
}

impl Default for ZoneLabels {
    fn default() -> Self {
        Self::from(&ZoneConfig::default())
    }
}

impl From<&ZoneConfig> for ZoneLabels {
    fn from(config: &ZoneConfig) -> Self {
        Self {
            qualifier: config.qualifier.trim().to_string(),
            pan_label: config.pan_label.clone(),
            no_zone_label: config.no_zone_label.clone(),
        }
    }
}

impl ZoneLabels {
    fn qualify(&self, base: &str) -> String {
        if self.qualifier.is_empty() {
            base.to_string()
        } else {
            format!("{} {}", base, self.qualifier)
        }
    }

    /// "North Bangalore"
    pub fn zone(&self, zone: Zone) -> String {
        self.qualify(zone.name())
    }

    /// "PAN Bangalore" for the pan-regional bucket.
    pub fn bucket(&self, bucket: Bucket) -> String {
        match bucket {
            Bucket::Zone(zone) => self.zone(zone),
            Bucket::Pan => self.qualify(&self.pan_label),
        }
    }

    pub fn label(&self, label: &ZoneLabel) -> String {
        match label {
            ZoneLabel::Direction(zone) => self.zone(*zone),
            ZoneLabel::NoZoneData => self.no_zone_label.clone(),
            ZoneLabel::Unrecognized(text) => text.clone(),
        }
    }

    /// Normalize and render in one step.
    pub fn normalize(&self, raw: Option<&str>) -> String {
        self.label(&normalize_zone(raw))
    }
}
