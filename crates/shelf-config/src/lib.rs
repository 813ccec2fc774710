//! Configuration and field catalog for shelf.
//!
//! shelf uses TOML configuration files named `.shelf.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.shelf.toml` files found, then loading `~/.shelf.toml` as the global config with lowest
//! precedence. The merged result describes every resource type's searchable fields and is
//! turned into a read-only [`FieldCatalog`] for the query compiler.

#![warn(missing_docs)]

mod catalog;
mod discovery;
mod error;
mod merge;
mod parse;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use catalog::{
    Capability, FieldCatalog, FieldDescriptor, ResourceCatalog, SortDescriptor, SortType,
    ValueType,
};
pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawBrowseSettings, RawConfig, RawField, RawResource, parse_config_file, parse_config_str,
};
use serde::Serialize;
pub use templates::config_template;
pub use validate::ConfigWarning;
use validate::validate_config;

/// Top-level merged configuration for shelf.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.shelf.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Browse settings.
    pub browse: BrowseSettings,
    /// Resource catalogs keyed by resource type.
    pub resources: BTreeMap<String, ResourceCatalog>,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.shelf.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Builds a configuration from a single TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let path = PathBuf::from("<inline>");
        let config = parse_config_str(contents, &path)?;
        let mut merged = merge_configs(&[ParsedConfig { path, config }])?;
        merged.config_root = None;
        Ok(merged)
    }

    /// Builds the read-only field catalog for the query compiler.
    pub fn catalog(&self) -> FieldCatalog {
        FieldCatalog::new(self.resources.values().cloned())
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }
}

/// Browse-related settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseSettings {
    /// Page size used when a browse request does not carry one.
    pub default_limit: usize,
    /// Distance from the anchor at which call-number browse ranges are bounded.
    pub call_number_range_offset: u64,
}

impl Default for BrowseSettings {
    fn default() -> Self {
        Self {
            default_limit: 100,
            call_number_range_offset: 100_000_000_000_000,
        }
    }
}
