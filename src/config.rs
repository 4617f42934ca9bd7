//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.acn-insights.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".acn-insights.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Zone labelling.
    #[serde(default)]
    pub zones: ZoneConfig,

    /// Reference resolution.
    #[serde(default)]
    pub linker: LinkerConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where the exported snapshot files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory containing the three files.
    #[serde(default = "default_data_dir")]
    pub dir: String,

    #[serde(default = "default_agents_file")]
    pub agents: String,

    #[serde(default = "default_enquiries_file")]
    pub enquiries: String,

    #[serde(default = "default_properties_file")]
    pub properties: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            agents: default_agents_file(),
            enquiries: default_enquiries_file(),
            properties: default_properties_file(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_agents_file() -> String {
    "agents.json".to_string()
}

fn default_enquiries_file() -> String {
    "enquiries.json".to_string()
}

fn default_properties_file() -> String {
    "properties.json".to_string()
}

/// Zone label settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Locale qualifier appended to directional labels ("North Bangalore").
    /// An empty qualifier yields bare labels ("North").
    #[serde(default = "default_qualifier")]
    pub qualifier: String,

    /// Label of the pan-regional bucket, qualified like the others.
    #[serde(default = "default_pan_label")]
    pub pan_label: String,

    /// Label used when a property carries no zone.
    #[serde(default = "default_no_zone_label")]
    pub no_zone_label: String,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            qualifier: default_qualifier(),
            pan_label: default_pan_label(),
            no_zone_label: default_no_zone_label(),
        }
    }
}

fn default_qualifier() -> String {
    "Bangalore".to_string()
}

fn default_pan_label() -> String {
    "PAN".to_string()
}

fn default_no_zone_label() -> String {
    "No Zone Data".to_string()
}

/// Reference resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Retry unknown inventory ids as property qcIds.
    #[serde(default = "default_true")]
    pub qc_id_fallback: bool,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            qc_id_fallback: true,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory for the per-zone id files and summary.json.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Agent ids previewed per zone on the console.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,

    /// Example property ids shown per rental category.
    #[serde(default = "default_example_limit")]
    pub example_limit: usize,

    /// Write one text file per zone bucket.
    #[serde(default = "default_true")]
    pub write_zone_files: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            preview_limit: default_preview_limit(),
            example_limit: default_example_limit(),
            write_zone_files: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> String {
    "zone-categorization".to_string()
}

fn default_preview_limit() -> usize {
    5
}

fn default_example_limit() -> usize {
    3
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.data_dir {
            self.data.dir = dir.display().to_string();
        }

        if let Some(ref qualifier) = args.qualifier {
            self.zones.qualifier = qualifier.clone();
        }

        if args.no_qc_fallback {
            self.linker.qc_id_fallback = false;
        }

        match &args.command {
            crate::cli::Command::Categorize(cmd) => {
                if let Some(ref dir) = cmd.output_dir {
                    self.report.output_dir = dir.display().to_string();
                }
                if cmd.no_files {
                    self.report.write_zone_files = false;
                }
            }
            crate::cli::Command::Rentals(cmd) => {
                if let Some(limit) = cmd.examples {
                    self.report.example_limit = limit;
                }
            }
            _ => {}
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, CategorizeArgs, Command};
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.dir, "data");
        assert_eq!(config.data.agents, "agents.json");
        assert_eq!(config.zones.qualifier, "Bangalore");
        assert!(config.linker.qc_id_fallback);
        assert_eq!(config.report.preview_limit, 5);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[data]
dir = "exports"

[zones]
qualifier = "Pune"

[linker]
qc_id_fallback = false

[report]
output_dir = "out"
preview_limit = 10
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.data.dir, "exports");
        assert_eq!(config.data.properties, "properties.json");
        assert_eq!(config.zones.qualifier, "Pune");
        assert_eq!(config.zones.pan_label, "PAN");
        assert!(!config.linker.qc_id_fallback);
        assert_eq!(config.report.output_dir, "out");
        assert_eq!(config.report.preview_limit, 10);
        assert!(config.report.write_zone_files);
    }

    #[test]
    fn test_merge_with_args() {
        let args = Args {
            data_dir: Some(PathBuf::from("/tmp/snap")),
            config: None,
            qualifier: Some(String::new()),
            no_qc_fallback: true,
            verbose: false,
            quiet: false,
            command: Command::Categorize(CategorizeArgs {
                output_dir: Some(PathBuf::from("zones-out")),
                no_files: true,
            }),
        };

        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.data.dir, "/tmp/snap");
        assert_eq!(config.zones.qualifier, "");
        assert!(!config.linker.qc_id_fallback);
        assert_eq!(config.report.output_dir, "zones-out");
        assert!(!config.report.write_zone_files);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[zones]"));
        assert!(toml_str.contains("[linker]"));
        assert!(toml_str.contains("[report]"));
    }
}
