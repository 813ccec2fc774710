//! Sort clause resolution.

use std::iter;

use shelf_config::{Capability, FieldCatalog, FieldDescriptor, SortType};
use shelf_cql::SortIndex;

use crate::{CompileError, FieldSort, SortOrder};

/// Prefix of the engine field a sortable field is sorted on by default.
pub const SORT_FIELD_PREFIX: &str = "sort_";

/// Modifier selecting ascending order.
const ASCENDING: &str = "sort.ascending";

/// Modifier selecting descending order.
const DESCENDING: &str = "sort.descending";

/// Returns the default sort field for a path, adding the prefix only once.
pub fn default_sort_field(path: &str) -> String {
    if path.starts_with(SORT_FIELD_PREFIX) {
        path.to_string()
    } else {
        format!("{SORT_FIELD_PREFIX}{path}")
    }
}

/// Resolves `sortBy` keys against the catalog.
pub struct SortResolver<'a> {
    /// Field metadata.
    catalog: &'a FieldCatalog,
}

impl<'a> SortResolver<'a> {
    /// Creates a resolver over a catalog.
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self { catalog }
    }

    /// Resolves sort keys, in priority order, into engine sorts.
    pub fn resolve(
        &self,
        indexes: &[SortIndex],
        resource: &str,
    ) -> Result<Vec<FieldSort>, CompileError> {
        let mut sorts = Vec::new();
        for index in indexes {
            sorts.extend(self.resolve_index(index, resource)?);
        }
        Ok(sorts)
    }

    /// Resolves one sort key; collection sorts expand to several engine sorts.
    fn resolve_index(
        &self,
        index: &SortIndex,
        resource: &str,
    ) -> Result<Vec<FieldSort>, CompileError> {
        let name = self.catalog.resolve_alias(resource, &index.base);
        let field = self.sortable_field(resource, name)?;
        let order = sort_order(index)?;
        let default_field = default_sort_field(&field.path);

        let Some(sort) = &field.sort else {
            return Ok(vec![FieldSort::new(default_field, order)]);
        };
        let primary = sort.field.clone().unwrap_or(default_field);

        match sort.kind {
            SortType::Single => Ok(vec![FieldSort::new(primary, order)]),
            SortType::Collection => {
                let mode = Some(order.collection_mode());
                let fields = iter::once(primary).chain(sort.secondary.iter().cloned());
                Ok(fields
                    .map(|field| FieldSort { field, order, mode })
                    .collect())
            }
        }
    }

    /// Finds the sortable descriptor under the literal name, then the prefixed one.
    fn sortable_field(&self, resource: &str, name: &str) -> Result<&'a FieldDescriptor, CompileError> {
        let catalog = self.catalog;
        catalog
            .describe_with(resource, name, Capability::Sort)
            .or_else(|| catalog.describe_with(resource, &default_sort_field(name), Capability::Sort))
            .ok_or_else(|| CompileError::InvalidSortField {
                field: name.to_string(),
                resource: resource.to_string(),
            })
    }
}

/// Direction from the key's modifiers; ascending unless `sort.descending` is given.
fn sort_order(index: &SortIndex) -> Result<SortOrder, CompileError> {
    let mut order = SortOrder::Asc;
    for modifier in &index.modifiers {
        order = match modifier.name.to_lowercase().as_str() {
            ASCENDING => SortOrder::Asc,
            DESCENDING => SortOrder::Desc,
            _ => {
                return Err(CompileError::UnsupportedFeature(format!(
                    "sort modifier '{}'",
                    modifier.name
                )));
            }
        };
    }
    Ok(order)
}
