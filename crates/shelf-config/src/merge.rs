//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`.

use std::{
    collections::{BTreeMap, HashSet},
    path::PathBuf,
};

use crate::{
    BrowseSettings, Config, ConfigError, FieldDescriptor, ResourceCatalog,
    parse::{RawBrowseSettings, RawConfig, RawField, RawResource},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to
/// the working directory), lowest precedence last (global config).
///
/// Merge rules:
/// - Browse settings: first defined value wins for each key
/// - Resources: merged by name, first definition wins completely
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let browse = merge_browse_settings(configs);
    let resources = merge_resources(configs)?;
    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(|p| p.to_path_buf());

    Ok(Config {
        browse,
        resources,
        config_root,
    })
}

/// Merges browse settings, taking the first defined value for each field.
fn merge_browse_settings(configs: &[ParsedConfig]) -> BrowseSettings {
    let mut result = BrowseSettings::default();

    // Lowest precedence first so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref browse) = parsed.config.browse {
            apply_raw_browse(&mut result, browse);
        }
    }

    result
}

/// Applies raw browse settings to result, overwriting any present values.
fn apply_raw_browse(result: &mut BrowseSettings, raw: &RawBrowseSettings) {
    if let Some(v) = raw.default_limit {
        result.default_limit = v;
    }
    if let Some(v) = raw.call_number_range_offset {
        result.call_number_range_offset = v;
    }
}

/// Merges resources from all configs; the first definition of a name wins.
fn merge_resources(
    configs: &[ParsedConfig],
) -> Result<BTreeMap<String, ResourceCatalog>, ConfigError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut resources = BTreeMap::new();

    for parsed in configs {
        let Some(ref raw_resources) = parsed.config.resource else {
            continue;
        };

        for (name, raw) in raw_resources {
            if !seen.insert(name.as_str()) {
                continue;
            }
            resources.insert(name.clone(), convert_resource(name, raw)?);
        }
    }

    Ok(resources)
}

/// Converts a raw resource into its catalog form.
fn convert_resource(name: &str, raw: &RawResource) -> Result<ResourceCatalog, ConfigError> {
    let groups = raw.groups.clone().unwrap_or_default();
    if let Some((group, _)) = groups.iter().find(|(_, members)| members.is_empty()) {
        return Err(ConfigError::EmptyGroup {
            resource: name.to_string(),
            group: group.clone(),
        });
    }

    let fields = raw
        .fields
        .iter()
        .flatten()
        .map(|(path, field)| (path.clone(), convert_field(path, field)))
        .collect();

    Ok(ResourceCatalog {
        name: name.to_string(),
        aliases: raw.aliases.clone().unwrap_or_default().into_iter().collect(),
        groups: groups.into_iter().collect(),
        fields,
    })
}

/// Converts a raw field into a descriptor.
fn convert_field(path: &str, raw: &RawField) -> FieldDescriptor {
    let mut capabilities = raw.capabilities.clone();
    capabilities.sort();
    capabilities.dedup();

    FieldDescriptor {
        path: path.to_string(),
        capabilities,
        multilang: raw.multilang,
        normalizer: raw.normalizer.clone(),
        value_type: raw.value_type,
        sort: raw.sort.clone(),
    }
}
