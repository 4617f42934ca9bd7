//! Snapshot loading.
//!
//! The three exports (agents, enquiries, properties) are JSON objects keyed
//! by record id. They are read once at startup and stay immutable for the
//! rest of the run.

use crate::models::{Agent, Enquiry, Property};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Records keyed by id, iterated in ascending id order.
pub type Table<T> = BTreeMap<String, T>;

/// Fatal problems with a snapshot file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {} as JSON", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} must contain a JSON object keyed by id, found {found}", .path.display())]
    NotAMapping { path: PathBuf, found: &'static str },
}

/// Locations of the three snapshot files.
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    pub agents: PathBuf,
    pub enquiries: PathBuf,
    pub properties: PathBuf,
}

impl From<&crate::config::DataConfig> for SnapshotPaths {
    fn from(config: &crate::config::DataConfig) -> Self {
        let dir = Path::new(&config.dir);
        Self {
            agents: dir.join(&config.agents),
            enquiries: dir.join(&config.enquiries),
            properties: dir.join(&config.properties),
        }
    }
}

/// Counters collected while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub agents: usize,
    pub enquiries: usize,
    pub properties: usize,
    /// Records that were not JSON objects.
    pub skipped_records: usize,
    /// Properties reachable through their qcId.
    pub qc_ids: usize,
}

/// The three lookup tables plus the qcId index.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub agents: Table<Agent>,
    pub enquiries: Table<Enquiry>,
    pub properties: Table<Property>,
    qc_index: HashMap<String, String>,
}

impl Snapshot {
    /// Read and parse all three files. The reads run concurrently.
    pub async fn load(paths: &SnapshotPaths) -> Result<(Self, LoadStats), LoadError> {
        info!("Loading snapshot files");
        let (agents, enquiries, properties) = tokio::try_join!(
            read_file(&paths.agents),
            read_file(&paths.enquiries),
            read_file(&paths.properties),
        )?;

        Self::parse(paths, &agents, &enquiries, &properties)
    }

    /// Parse already-read file contents.
    pub fn parse(
        paths: &SnapshotPaths,
        agents: &[u8],
        enquiries: &[u8],
        properties: &[u8],
    ) -> Result<(Self, LoadStats), LoadError> {
        let mut stats = LoadStats::default();

        let agents: Table<Agent> = parse_table(&paths.agents, agents, &mut stats)?;
        let enquiries: Table<Enquiry> = parse_table(&paths.enquiries, enquiries, &mut stats)?;
        let properties: Table<Property> = parse_table(&paths.properties, properties, &mut stats)?;

        stats.agents = agents.len();
        stats.enquiries = enquiries.len();
        stats.properties = properties.len();

        let snapshot = Self::from_tables(agents, enquiries, properties);
        stats.qc_ids = snapshot.qc_index.len();

        info!(
            "Loaded {} agents, {} enquiries, {} properties",
            stats.agents, stats.enquiries, stats.properties
        );
        if stats.skipped_records > 0 {
            warn!("Skipped {} records that were not objects", stats.skipped_records);
        }

        Ok((snapshot, stats))
    }

    /// Build a snapshot from tables, indexing properties by qcId.
    pub fn from_tables(
        agents: Table<Agent>,
        enquiries: Table<Enquiry>,
        properties: Table<Property>,
    ) -> Self {
        let mut qc_index = HashMap::new();
        for (id, property) in &properties {
            if let Some(qc_id) = property.qc_id.as_deref().filter(|qc| !qc.is_empty()) {
                qc_index.insert(qc_id.to_string(), id.clone());
            }
        }
        debug!("Indexed {} properties by qcId", qc_index.len());

        Self {
            agents,
            enquiries,
            properties,
            qc_index,
        }
    }

    pub fn enquiry(&self, id: &str) -> Option<&Enquiry> {
        self.enquiries.get(id)
    }

    pub fn property(&self, id: &str) -> Option<(&str, &Property)> {
        self.properties
            .get_key_value(id)
            .map(|(key, property)| (key.as_str(), property))
    }

    /// Look up a property by its qcId, returning its table id.
    pub fn property_by_qc_id(&self, qc_id: &str) -> Option<(&str, &Property)> {
        self.qc_index
            .get(qc_id)
            .and_then(|id| self.property(id))
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    debug!("Reading {}", path.display());
    tokio::fs::read(path).await.map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_table<T: DeserializeOwned>(
    path: &Path,
    bytes: &[u8],
    stats: &mut LoadStats,
) -> Result<Table<T>, LoadError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let records = match value {
        Value::Object(records) => records,
        other => {
            return Err(LoadError::NotAMapping {
                path: path.to_path_buf(),
                found: json_kind(&other),
            })
        }
    };

    let mut table = Table::new();
    for (id, record) in records {
        if !record.is_object() {
            warn!(
                "Skipping record {} in {}: expected an object, found {}",
                id,
                path.display(),
                json_kind(&record)
            );
            stats.skipped_records += 1;
            continue;
        }

        match serde_json::from_value(record) {
            Ok(parsed) => {
                table.insert(id, parsed);
            }
            Err(e) => {
                warn!("Skipping record {} in {}: {}", id, path.display(), e);
                stats.skipped_records += 1;
            }
        }
    }

    Ok(table)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build a snapshot from inline JSON values.
#[cfg(test)]
pub(crate) fn snapshot_from_json(agents: Value, enquiries: Value, properties: Value) -> Snapshot {
    let paths = SnapshotPaths {
        agents: PathBuf::from("agents.json"),
        enquiries: PathBuf::from("enquiries.json"),
        properties: PathBuf::from("properties.json"),
    };
    let (snapshot, _) = Snapshot::parse(
        &paths,
        agents.to_string().as_bytes(),
        enquiries.to_string().as_bytes(),
        properties.to_string().as_bytes(),
    )
    .unwrap();
    snapshot
}

/// Paths of the bundled fixture snapshot.
#[cfg(test)]
pub(crate) fn fixture_paths() -> SnapshotPaths {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    SnapshotPaths {
        agents: dir.join("agents.json"),
        enquiries: dir.join("enquiries.json"),
        properties: dir.join("properties.json"),
    }
}
