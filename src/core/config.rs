//! Plugin configuration with documented defaults
//!
//! Every host constant the ledger depends on (property ids, the record key,
//! file names) is collected here so a region can be replayed outside the game
//! with different values.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::persist::record::RecordKey;

/// Errors raised while loading or validating a [`SupplyConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the regional supply plugin
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SupplyConfig {
    // === PERSISTENCE ===
    /// Directory holding one sub-directory per region
    pub regions_directory: PathBuf,

    /// File name of the packed container inside a region directory
    pub data_file_name: String,

    /// Key of the ledger record inside the packed container
    pub record_key: RecordKey,

    // === LOGGING ===
    /// Default level for the `regional_supply` target when `RUST_LOG` is unset
    ///
    /// The in-game plugin only reports errors, so that is the default here too.
    pub log_level: String,

    // === SCRIPTING ===
    /// Name of the scripting table the entry points are registered under
    pub script_table: String,

    // === BUILDING PROPERTIES ===
    /// Occupant type id of buildings; other occupants never touch the ledger
    pub building_occupant_type: u32,

    /// Property listing the id/amount pairs a building consumes
    pub consumed_property: u32,

    /// Property listing the id/amount pairs a building produces
    pub produced_property: u32,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            regions_directory: PathBuf::from("Regions"),
            data_file_name: "RegionalSupplyData.dat".into(),
            record_key: RecordKey::REGIONAL_SUPPLY,

            log_level: "error".into(),

            script_table: "regional_supply".into(),

            building_occupant_type: 0x278128A0,
            consumed_property: 0x16F4C223,
            produced_property: 0x16F4C224,
        }
    }
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl SupplyConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a TOML config string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SupplyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_file_name.trim().is_empty() {
            return Err(ConfigError::Invalid("data_file_name must not be empty".into()));
        }

        if self.script_table.trim().is_empty() {
            return Err(ConfigError::Invalid("script_table must not be empty".into()));
        }

        // A single property can't be both sides of the ledger
        if self.consumed_property == self.produced_property {
            return Err(ConfigError::Invalid(format!(
                "consumed_property and produced_property are both 0x{:08X}",
                self.consumed_property
            )));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}', expected one of {:?}",
                self.log_level, LOG_LEVELS
            )));
        }

        Ok(())
    }

    /// Path of the ledger data file for a region directory name
    ///
    /// Returns `None` when the region has no directory name, in which case
    /// the ledger is neither loaded nor saved.
    pub fn region_data_path(&self, directory_name: &str) -> Option<PathBuf> {
        if directory_name.is_empty() {
            return None;
        }
        Some(
            self.regions_directory
                .join(directory_name)
                .join(&self.data_file_name),
        )
    }
}
