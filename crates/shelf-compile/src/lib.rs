//! CQL query compilation for shelf.
//!
//! Turns a parsed CQL tree into a composite search engine query, and recovers browse
//! pagination state from compiled queries:
//!
//! - **Terms**: aliases and multi-field groups are resolved, values normalized and the
//!   comparator dispatched to a strategy aware of the field's type
//! - **Booleans**: same-operator chains are flattened, same-field AND ranges collapsed and
//!   exact constraints on filter fields promoted to filter context
//! - **Sorts**: `sortBy` keys resolve to engine sort fields with min/max modes for
//!   multi-valued fields
//! - **Facets**: aggregations carve out already selected values
//! - **Browse**: range-shaped queries become a [`BrowseContext`]
//!
//! # Example
//!
//! ```
//! use shelf_compile::{Query, QueryCompiler};
//! use shelf_config::Config;
//! use shelf_cql::CqlNode;
//!
//! let config = Config::from_toml_str(
//!     r#"
//!     [resource.instance.fields.languages]
//!     capabilities = ["filter", "facet"]
//!     "#,
//! )
//! .unwrap();
//! let compiler = QueryCompiler::from_config(&config).unwrap();
//! let search = compiler
//!     .compile_query(&CqlNode::term("languages", "==", "eng"), "instance")
//!     .unwrap();
//! assert_eq!(search.query, Query::term("languages", "eng").into_filter());
//! ```

#![warn(missing_docs)]

mod boolean;
mod browse;
mod compiler;
mod dispatch;
mod error;
mod facet;
mod normalize;
mod promote;
mod query;
mod sort;
mod term;
#[cfg(test)]
mod test_support;

pub use boolean::BooleanCompiler;
pub use browse::{BrowseContext, BrowseContextBuilder, BrowseRequest, CallNumberBrowseBuilder};
pub use compiler::QueryCompiler;
pub use dispatch::{
    AdjBuilder, AllBuilder, AnyBuilder, ComparatorDispatch, EqualBuilder, ExactBuilder,
    FulltextTarget, GroupMember, LITERAL_FIELD_PREFIX, NotEqualBuilder, RangeBound, RangeBuilder,
    TermQueryBuilder, WILDCARD_COMPARATOR, WildcardBuilder, literal_field,
};
pub use error::{CompileError, RegistryError};
pub use facet::{
    AggregationSpec, Bucket, FacetCompiler, FacetRequest, SELECTED_PREFIX, merge_facet_buckets,
};
pub use normalize::{NormalizationRegistry, Normalizer, encode_call_number, shelf_key};
pub use promote::promote_filters;
pub use query::{
    BoolQuery, FieldSort, MatchMode, Occur, Query, RangeQuery, SearchQuery, SortMode, SortOrder,
    TermValue,
};
pub use sort::{SORT_FIELD_PREFIX, SortResolver, default_sort_field};
pub use term::TermCompiler;
