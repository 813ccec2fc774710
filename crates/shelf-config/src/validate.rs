//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use crate::{Capability, Config, ResourceCatalog};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// No resources are defined.
    NoResourcesDefined,
    /// A group names a field that has no descriptor.
    UndefinedGroupMember {
        /// Resource type.
        resource: String,
        /// Group name.
        group: String,
        /// Member field that is not described.
        field: String,
    },
    /// An alias rewrites to a name that is neither a field nor a group.
    UndefinedAliasTarget {
        /// Resource type.
        resource: String,
        /// Alias name.
        alias: String,
        /// Target that does not resolve.
        target: String,
    },
    /// A field declares sort behavior without the sort capability.
    SortWithoutCapability {
        /// Resource type.
        resource: String,
        /// Field path.
        field: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResourcesDefined => write!(f, "no resources are defined in configuration"),
            Self::UndefinedGroupMember {
                resource,
                group,
                field,
            } => write!(
                f,
                "group '{group}' of resource '{resource}' names undefined field '{field}'"
            ),
            Self::UndefinedAliasTarget {
                resource,
                alias,
                target,
            } => write!(
                f,
                "alias '{alias}' of resource '{resource}' points to unknown name '{target}'"
            ),
            Self::SortWithoutCapability { resource, field } => write!(
                f,
                "field '{field}' of resource '{resource}' has sort settings but no sort capability"
            ),
        }
    }
}

/// Validates the configuration and returns any warnings.
///
/// This checks for:
/// - Empty configuration (no resources defined)
/// - Group members and alias targets that don't resolve
/// - Sort settings on fields that cannot be sorted
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    if config.resources.is_empty() {
        return vec![ConfigWarning::NoResourcesDefined];
    }

    config.resources.values().flat_map(validate_resource).collect()
}

/// Validates a single resource catalog.
fn validate_resource(resource: &ResourceCatalog) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    for (group, members) in &resource.groups {
        for field in members {
            if !resource.fields.contains_key(field) {
                warnings.push(ConfigWarning::UndefinedGroupMember {
                    resource: resource.name.clone(),
                    group: group.clone(),
                    field: field.clone(),
                });
            }
        }
    }

    for (alias, target) in &resource.aliases {
        if !resource.fields.contains_key(target) && !resource.groups.contains_key(target) {
            warnings.push(ConfigWarning::UndefinedAliasTarget {
                resource: resource.name.clone(),
                alias: alias.clone(),
                target: target.clone(),
            });
        }
    }

    for field in resource.fields.values() {
        if field.sort.is_some() && !field.has(Capability::Sort) {
            warnings.push(ConfigWarning::SortWithoutCapability {
                resource: resource.name.clone(),
                field: field.path.clone(),
            });
        }
    }

    warnings
}
