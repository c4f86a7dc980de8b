//! Engine configuration via `docpath.toml`
//!
//! On first open, a default `docpath.toml` is created next to the data file.
//! To change settings, edit the file and restart.

use docpath_core::{Error, Result, DEFAULT_LEAF_KEY};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "docpath.toml";

/// What AddColumn does to elements that already have the column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddColumnMode {
    /// Set the default on every object element, replacing existing values
    Overwrite,
    /// Only fill elements that lack the column
    Preserve,
}

/// Engine configuration loaded from `docpath.toml`.
///
/// # Example
///
/// ```toml
/// data_file = "data.json"
/// add_column = "overwrite"
/// type_sample_size = 0
/// leaf_key = "value"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// JSON file holding the collection, relative to the config directory.
    #[serde(default = "default_data_file")]
    pub data_file: String,
    /// AddColumn semantics: `"overwrite"` or `"preserve"`.
    #[serde(default = "default_add_column")]
    pub add_column: String,
    /// Documents inspected when inferring field types; 0 means all.
    #[serde(default)]
    pub type_sample_size: usize,
    /// Placeholder key for a bare leaf when flattening.
    #[serde(default = "default_leaf_key")]
    pub leaf_key: String,
}

fn default_data_file() -> String {
    "data.json".to_string()
}

fn default_add_column() -> String {
    "overwrite".to_string()
}

fn default_leaf_key() -> String {
    DEFAULT_LEAF_KEY.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            add_column: default_add_column(),
            type_sample_size: 0,
            leaf_key: default_leaf_key(),
        }
    }
}

impl EngineConfig {
    /// Parse the add_column string into an `AddColumnMode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"overwrite"` or `"preserve"`.
    pub fn add_column_mode(&self) -> Result<AddColumnMode> {
        match self.add_column.as_str() {
            "overwrite" => Ok(AddColumnMode::Overwrite),
            "preserve" => Ok(AddColumnMode::Preserve),
            other => Err(Error::invalid_input(format!(
                "Invalid add_column mode '{}' in docpath.toml. \
                 Expected \"overwrite\" or \"preserve\".",
                other
            ))),
        }
    }

    /// Check every setting that has a restricted domain
    pub fn validate(&self) -> Result<()> {
        self.add_column_mode()?;
        if self.leaf_key.is_empty() || self.leaf_key.contains('.') {
            return Err(Error::invalid_input(format!(
                "Invalid leaf_key '{}' in docpath.toml. It must be non-empty and contain no '.'.",
                self.leaf_key
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# docpath engine configuration
#
# JSON file holding the document collection (relative to this file)
data_file = "data.json"

# AddColumn semantics: "overwrite" (default) or "preserve"
#   "overwrite" = set the default on every row, replacing existing values
#   "preserve"  = only fill rows that lack the column
add_column = "overwrite"

# Documents inspected when inferring field types (0 = all)
type_sample_size = 0

# Key used for a bare value when flattening rows for display or export
leaf_key = "value"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: EngineConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_input(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::io(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::invalid_input(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::io(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
