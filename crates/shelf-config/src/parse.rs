//! Configuration file parsing.
//!
//! Parses individual `.shelf.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::{Capability, ConfigError, SortDescriptor, ValueType};

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Browse settings section.
    pub browse: Option<RawBrowseSettings>,
    /// Resource definitions: resource type -> field catalog.
    pub resource: Option<HashMap<String, RawResource>>,
}

/// Raw browse settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBrowseSettings {
    /// Page size used when a browse request does not carry one.
    pub default_limit: Option<usize>,
    /// Distance from the anchor at which call-number browse ranges are bounded.
    pub call_number_range_offset: Option<u64>,
}

/// Raw resource definition from TOML.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawResource {
    /// Field name rewrites applied before any lookup.
    pub aliases: Option<HashMap<String, String>>,
    /// Multi-field groups. Each value accepts a single field or an array of fields.
    #[serde_as(as = "Option<HashMap<_, OneOrMany<_>>>")]
    pub groups: Option<HashMap<String, Vec<String>>>,
    /// Field descriptors keyed by field path.
    pub fields: Option<HashMap<String, RawField>>,
}

/// Raw field descriptor from TOML.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawField {
    /// Capability tags. Accepts either a single string or an array of strings.
    #[serde_as(as = "OneOrMany<_>")]
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    /// Whether the field is indexed per language.
    #[serde(default)]
    pub multilang: bool,
    /// Name of the term normalizer applied to search values.
    pub normalizer: Option<String>,
    /// Underlying value type of the indexed field.
    #[serde(default)]
    pub value_type: ValueType,
    /// Sort behavior for the field.
    pub sort: Option<SortDescriptor>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context (tests only).
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// This is used during discovery to stop traversal at root configs.
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
