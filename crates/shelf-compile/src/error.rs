//! Error types for query compilation.

use thiserror::Error;

/// Errors raised while compiling a single request.
///
/// Every variant names the offending field, value or construct. Errors are terminal for the
/// request; nothing is retried or silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A search field path resolves to neither a field nor a group.
    #[error("invalid search field '{field}' for resource '{resource}'")]
    InvalidField {
        /// Requested field path.
        field: String,
        /// Resource type being searched.
        resource: String,
    },

    /// A sort key does not resolve to a sortable field.
    #[error("invalid sort field '{field}' for resource '{resource}'")]
    InvalidSortField {
        /// Requested sort key.
        field: String,
        /// Resource type being searched.
        resource: String,
    },

    /// A facet request is not of the form `name[:limit]`.
    #[error("invalid facet '{facet}': expected name[:limit]")]
    InvalidFacetFormat {
        /// Raw facet request.
        facet: String,
    },

    /// A facet name does not resolve to a facetable field.
    #[error("invalid facet field '{field}' for resource '{resource}'")]
    InvalidFacetField {
        /// Requested facet name.
        field: String,
        /// Resource type being searched.
        resource: String,
    },

    /// A compiled query cannot be interpreted as a browse request.
    #[error("invalid browse query '{query}': {reason}")]
    InvalidBrowseQuery {
        /// What made the query unusable.
        reason: String,
        /// Canonical text of the original query.
        query: String,
    },

    /// The expression uses a construct the compiler does not support.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// A literal does not match the value type of its field.
    #[error("invalid value '{value}' for field '{field}': {reason}")]
    ValueValidation {
        /// Field path.
        field: String,
        /// Offending literal.
        value: String,
        /// Expected format.
        reason: String,
    },
}

/// Errors raised while building the start-time registries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two strategies claim the same comparator.
    #[error("comparator '{comparator}' is claimed by both '{first}' and '{second}'")]
    DuplicateComparator {
        /// Contested comparator token.
        comparator: String,
        /// Strategy registered first.
        first: String,
        /// Strategy registered second.
        second: String,
    },

    /// A normalizer name is registered twice.
    #[error("normalizer '{name}' is registered more than once")]
    DuplicateNormalizer {
        /// Normalizer name.
        name: String,
    },

    /// The field catalog names a normalizer that is not registered.
    #[error("field '{field}' of resource '{resource}' uses unknown normalizer '{name}'")]
    UnknownNormalizer {
        /// Resource type.
        resource: String,
        /// Field path.
        field: String,
        /// Normalizer name.
        name: String,
    },
}
