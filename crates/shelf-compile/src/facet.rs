//! Facet aggregation requests.
//!
//! A facet on a field the query already filters would otherwise only report the selected
//! values. The compiler carves those constraints out: selected values get their own
//! aggregation, the rest of the values are counted under the remaining filters.

use std::{collections::BTreeMap, sync::LazyLock};

use log::debug;
use regex::Regex;
use serde::Serialize;
use shelf_config::{Capability, FieldCatalog};

use crate::{CompileError, Query, TermValue};

/// Name prefix of the aggregation that counts already-selected values.
pub const SELECTED_PREFIX: &str = "selected_";

/// `name` or `name:limit`, with a limit of up to ten digits.
static FACET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z.]+)(:(\d{1,10}))?$").expect("facet pattern should compile")
});

/// A parsed facet request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRequest {
    /// Facet name as requested.
    pub name: String,
    /// Maximum number of buckets; `None` means unbounded.
    pub size: Option<u64>,
}

impl FacetRequest {
    /// Parses `name[:limit]`.
    pub fn parse(facet: &str) -> Result<Self, CompileError> {
        let invalid = || CompileError::InvalidFacetFormat {
            facet: facet.to_string(),
        };
        let captures = FACET_PATTERN.captures(facet).ok_or_else(invalid)?;
        let size = captures
            .get(3)
            .map(|limit| limit.as_str().parse::<u64>())
            .transpose()
            .map_err(|_| invalid())?;
        Ok(Self {
            name: captures[1].to_string(),
            size,
        })
    }
}

/// An aggregation to run alongside the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AggregationSpec {
    /// Count documents per distinct value.
    Terms {
        /// Aggregation name.
        name: String,
        /// Field to aggregate.
        field: String,
        /// Maximum number of buckets; `None` means unbounded.
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
        /// Only these values are counted.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        include: Vec<TermValue>,
        /// These values are not counted.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        exclude: Vec<TermValue>,
    },
    /// Runs nested aggregations over documents matching the filters.
    Filter {
        /// Aggregation name.
        name: String,
        /// Filters scoping the nested aggregations.
        filters: Vec<Query>,
        /// Nested aggregations.
        aggregations: Vec<Self>,
    },
}

impl AggregationSpec {
    /// Aggregation name.
    pub fn name(&self) -> &str {
        match self {
            Self::Terms { name, .. } | Self::Filter { name, .. } => name,
        }
    }
}

/// One aggregation result bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// Bucket value.
    pub key: TermValue,
    /// Number of matching documents.
    pub doc_count: u64,
}

/// Builds facet aggregations for a compiled query.
pub struct FacetCompiler<'a> {
    /// Field metadata.
    catalog: &'a FieldCatalog,
}

impl<'a> FacetCompiler<'a> {
    /// Creates a facet compiler over a catalog.
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self { catalog }
    }

    /// Builds the aggregations for each requested facet, in request order.
    pub fn build<S: AsRef<str>>(
        &self,
        query: &Query,
        facets: &[S],
        resource: &str,
    ) -> Result<Vec<AggregationSpec>, CompileError> {
        let mut aggregations = Vec::new();
        for facet in facets {
            let request = FacetRequest::parse(facet.as_ref())?;
            aggregations.extend(self.build_one(query, &request, resource)?);
        }
        Ok(aggregations)
    }

    /// Builds the aggregations for one facet.
    fn build_one(
        &self,
        query: &Query,
        request: &FacetRequest,
        resource: &str,
    ) -> Result<Vec<AggregationSpec>, CompileError> {
        let field = self.facet_field(&request.name, resource)?;
        let (selected, remaining) = split_filters(query, field);
        debug!(
            "facet '{}': {} selected value(s), {} remaining filter(s)",
            request.name,
            selected.len(),
            remaining.len()
        );

        let terms = terms_aggregations(&request.name, field, request.size, selected);
        if remaining.is_empty() {
            return Ok(terms);
        }
        Ok(vec![AggregationSpec::Filter {
            name: request.name.clone(),
            filters: remaining,
            aggregations: terms,
        }])
    }

    /// Resolves a facet name to a facetable field path.
    fn facet_field(&self, name: &str, resource: &str) -> Result<&'a str, CompileError> {
        let catalog = self.catalog;
        let path = catalog
            .resolve_group(resource, name)
            .first()
            .map_or(name, String::as_str);
        catalog
            .describe_with(resource, path, Capability::Facet)
            .map(|field| field.path.as_str())
            .ok_or_else(|| CompileError::InvalidFacetField {
                field: name.to_string(),
                resource: resource.to_string(),
            })
    }
}

/// Filters the facet scans: the query's own filter list plus the filter lists of scored
/// boolean queries in its `must` list.
fn scoped_filters(query: &Query) -> Vec<&Query> {
    let Some(root) = query.as_bool() else {
        return Vec::new();
    };
    let mut filters: Vec<&Query> = root.filter.iter().collect();
    for clause in &root.must {
        if let Query::Scored { query: inner, .. } = clause
            && let Some(inner) = inner.as_bool()
        {
            filters.extend(&inner.filter);
        }
    }
    filters
}

/// Separates constraints on the facet field from the other filters.
///
/// Returns the selected values (deduplicated, in order of appearance) and clones of the
/// filters that do not constrain the field.
fn split_filters(query: &Query, field: &str) -> (Vec<TermValue>, Vec<Query>) {
    let mut selected: Vec<TermValue> = Vec::new();
    let mut remaining = Vec::new();

    for filter in scoped_filters(query) {
        let values = selected_values(filter, field);
        if values.is_empty() {
            remaining.push(filter.clone());
            continue;
        }
        for value in values {
            if !selected.contains(value) {
                selected.push(value.clone());
            }
        }
    }
    (selected, remaining)
}

/// Values a filter selects on the field: a term, or every term of a disjunction.
fn selected_values<'q>(filter: &'q Query, field: &str) -> Vec<&'q TermValue> {
    match filter {
        Query::Term { field: f, value } if f == field => vec![value],
        Query::Bool(bool_query) if filter.disjunction_field() == Some(field) => bool_query
            .should
            .iter()
            .filter_map(|clause| clause.as_term().map(|(_, value)| value))
            .collect(),
        _ => Vec::new(),
    }
}

/// Terms aggregations for a facet with the given selected values.
fn terms_aggregations(
    name: &str,
    field: &str,
    size: Option<u64>,
    selected: Vec<TermValue>,
) -> Vec<AggregationSpec> {
    let terms = |name: String,
                 size: Option<u64>,
                 include: Vec<TermValue>,
                 exclude: Vec<TermValue>| AggregationSpec::Terms {
        name,
        field: field.to_string(),
        size,
        include,
        exclude,
    };
    if selected.is_empty() {
        return vec![terms(name.to_string(), size, Vec::new(), Vec::new())];
    }

    let count = selected.len() as u64;
    let selected_name = format!("{SELECTED_PREFIX}{name}");
    match size {
        Some(size) if size <= count => {
            vec![terms(selected_name, Some(count), selected, Vec::new())]
        }
        _ => vec![
            terms(
                name.to_string(),
                size.map(|size| size - count),
                Vec::new(),
                selected.clone(),
            ),
            terms(selected_name, Some(count), selected, Vec::new()),
        ],
    }
}

/// Merges aggregation results back into one bucket list per facet.
///
/// Results of `selected_<name>` aggregations are listed before those of `<name>`; within
/// each, buckets keep their source order.
pub fn merge_facet_buckets(
    results: impl IntoIterator<Item = (String, Vec<Bucket>)>,
) -> BTreeMap<String, Vec<Bucket>> {
    let mut selected: BTreeMap<String, Vec<Bucket>> = BTreeMap::new();
    let mut unselected: BTreeMap<String, Vec<Bucket>> = BTreeMap::new();

    for (name, buckets) in results {
        match name.strip_prefix(SELECTED_PREFIX) {
            Some(facet) => selected.entry(facet.to_string()).or_default().extend(buckets),
            None => unselected.entry(name).or_default().extend(buckets),
        }
    }

    for (facet, buckets) in unselected {
        selected.entry(facet).or_default().extend(buckets);
    }
    selected
}
