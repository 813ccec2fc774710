//! Read-only field catalog.
//!
//! The catalog describes, per resource type, which fields exist, what they can be used
//! for, and how names are rewritten before lookup. It is built once from the merged
//! configuration and then shared by reference; nothing mutates it afterwards.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// What a field can be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Exact constraints on the field are applied in filter context.
    Filter,
    /// The field can appear in a `sortBy` clause.
    Sort,
    /// The field can be aggregated into facets.
    Facet,
    /// The field is analyzed for full-text search.
    Fulltext,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Filter => "filter",
            Self::Sort => "sort",
            Self::Facet => "facet",
            Self::Fulltext => "fulltext",
        })
    }
}

/// Underlying value type of an indexed field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Untokenized string.
    #[default]
    Keyword,
    /// Date or date-time.
    Date,
    /// 64-bit integer.
    Long,
    /// `true` / `false`.
    Boolean,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Keyword => "keyword",
            Self::Date => "date",
            Self::Long => "long",
            Self::Boolean => "boolean",
        })
    }
}

/// How values of a sort field are laid out in the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    /// One value per document.
    #[default]
    Single,
    /// Several values per document; sorting picks the min or max.
    Collection,
}

/// Sort behavior declared for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    /// Engine field to sort on; defaults to the `sort_`-prefixed field path.
    #[serde(default)]
    pub field: Option<String>,
    /// Value layout of the sort field.
    #[serde(rename = "type", default)]
    pub kind: SortType,
    /// Tie-break fields sorted in the same direction (collection sorts only).
    #[serde(default)]
    pub secondary: Vec<String>,
}

/// Describes one searchable field of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Field path, e.g. `contributors.name`.
    pub path: String,
    /// Capability tags.
    pub capabilities: Vec<Capability>,
    /// Whether the field is indexed per language (`path.*`).
    pub multilang: bool,
    /// Term normalizer applied to search values, by registry name.
    pub normalizer: Option<String>,
    /// Underlying value type.
    pub value_type: ValueType,
    /// Sort behavior, if any.
    pub sort: Option<SortDescriptor>,
}

impl FieldDescriptor {
    /// Creates a keyword field with the given capabilities.
    pub fn new(path: impl Into<String>, capabilities: &[Capability]) -> Self {
        Self {
            path: path.into(),
            capabilities: capabilities.to_vec(),
            multilang: false,
            normalizer: None,
            value_type: ValueType::Keyword,
            sort: None,
        }
    }

    /// Returns true if the field carries the capability.
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Returns true if the field is analyzed for full-text search.
    pub fn is_fulltext(&self) -> bool {
        self.has(Capability::Fulltext)
    }
}

/// Catalog of one resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceCatalog {
    /// Resource type name.
    pub name: String,
    /// Field name rewrites.
    pub aliases: BTreeMap<String, String>,
    /// Multi-field groups.
    pub groups: BTreeMap<String, Vec<String>>,
    /// Field descriptors keyed by path.
    pub fields: BTreeMap<String, FieldDescriptor>,
}

/// Field metadata for all resource types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    /// Resource catalogs keyed by resource type.
    resources: BTreeMap<String, ResourceCatalog>,
}

impl FieldCatalog {
    /// Creates a catalog from per-resource catalogs.
    pub fn new(resources: impl IntoIterator<Item = ResourceCatalog>) -> Self {
        Self {
            resources: resources
                .into_iter()
                .map(|resource| (resource.name.clone(), resource))
                .collect(),
        }
    }

    /// Returns the catalog of a resource type.
    pub fn resource(&self, resource: &str) -> Option<&ResourceCatalog> {
        self.resources.get(resource)
    }

    /// Iterates over all resource catalogs in name order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceCatalog> {
        self.resources.values()
    }

    /// Rewrites a field path through the resource's aliases.
    ///
    /// Paths without an alias are returned unchanged.
    pub fn resolve_alias<'a>(&'a self, resource: &str, path: &'a str) -> &'a str {
        self.resource(resource)
            .and_then(|r| r.aliases.get(path))
            .map_or(path, String::as_str)
    }

    /// Returns the member fields of a multi-field group, or an empty slice.
    pub fn resolve_group(&self, resource: &str, path: &str) -> &[String] {
        self.resource(resource)
            .and_then(|r| r.groups.get(path))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Looks up a field descriptor.
    pub fn describe(&self, resource: &str, path: &str) -> Option<&FieldDescriptor> {
        self.resource(resource).and_then(|r| r.fields.get(path))
    }

    /// Looks up a field descriptor that carries the given capability.
    pub fn describe_with(
        &self,
        resource: &str,
        path: &str,
        capability: Capability,
    ) -> Option<&FieldDescriptor> {
        self.describe(resource, path)
            .filter(|field| field.has(capability))
    }

    /// Iterates over `(resource, field, normalizer)` for every field naming a normalizer.
    pub fn normalizer_references(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.resources.values().flat_map(|resource| {
            resource.fields.values().filter_map(move |field| {
                field.normalizer.as_deref().map(|normalizer| {
                    (resource.name.as_str(), field.path.as_str(), normalizer)
                })
            })
        })
    }
}
