//! The compiler facade.
//!
//! [`QueryCompiler`] owns the start-time tables and exposes every per-request operation.
//! The tables are shared snapshots: a configuration reload builds a new compiler and
//! swaps it in, nothing is mutated in place.

use std::sync::Arc;

use log::debug;
use shelf_config::{BrowseSettings, Config, FieldCatalog};
use shelf_cql::{CqlNode, SortIndex};

use crate::{
    AggregationSpec, BooleanCompiler, BrowseContext, BrowseContextBuilder, BrowseRequest,
    CallNumberBrowseBuilder, CompileError, ComparatorDispatch, FacetCompiler, FieldSort,
    NormalizationRegistry, Query, RegistryError, SearchQuery, SortResolver, TermCompiler,
    promote_filters,
};

/// Compiles CQL trees, sorts, facets and browse contexts against one catalog.
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    /// Field metadata.
    catalog: Arc<FieldCatalog>,
    /// Value normalizers.
    normalizers: Arc<NormalizationRegistry>,
    /// Comparator strategies.
    dispatch: Arc<ComparatorDispatch>,
    /// Browse settings.
    browse: BrowseSettings,
}

impl QueryCompiler {
    /// Creates a compiler, rejecting catalogs that name unregistered normalizers.
    pub fn new(
        catalog: Arc<FieldCatalog>,
        normalizers: Arc<NormalizationRegistry>,
        dispatch: Arc<ComparatorDispatch>,
        browse: BrowseSettings,
    ) -> Result<Self, RegistryError> {
        let unknown = catalog
            .normalizer_references()
            .find(|(_, _, name)| !normalizers.contains(name));
        if let Some((resource, field, name)) = unknown {
            return Err(RegistryError::UnknownNormalizer {
                resource: resource.to_string(),
                field: field.to_string(),
                name: name.to_string(),
            });
        }
        Ok(Self {
            catalog,
            normalizers,
            dispatch,
            browse,
        })
    }

    /// Creates a compiler with the standard normalizers and comparators.
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        Self::new(
            Arc::new(config.catalog()),
            Arc::new(NormalizationRegistry::standard()?),
            Arc::new(ComparatorDispatch::standard()?),
            config.browse.clone(),
        )
    }

    /// Field metadata.
    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Browse settings.
    pub fn browse_settings(&self) -> &BrowseSettings {
        &self.browse
    }

    /// A leaf compiler over the shared tables.
    fn terms(&self) -> TermCompiler<'_> {
        TermCompiler::new(&self.catalog, &self.normalizers, &self.dispatch)
    }

    /// Compiles an expression tree.
    ///
    /// A root `sortBy` node contributes the sort keys; the query itself is compiled from
    /// its subtree and filter-capable clauses are promoted to filter context.
    pub fn compile_query(
        &self,
        node: &CqlNode,
        resource: &str,
    ) -> Result<SearchQuery, CompileError> {
        debug!("compiling '{}' for {resource}", node.to_cql_string());
        let (subtree, indexes) = match node {
            CqlNode::Sort { subtree, indexes } => (subtree.as_ref(), indexes.as_slice()),
            other => (other, [].as_slice()),
        };

        let query = BooleanCompiler::new(self.terms()).compile(subtree, resource)?;
        let query = promote_filters(query, &self.catalog, resource);
        let sort = self.resolve_sort(indexes, resource)?;
        debug!(
            "compiled query for {resource} with {} sort key(s)",
            sort.len()
        );
        Ok(SearchQuery { query, sort })
    }

    /// Resolves sort keys into engine sorts.
    pub fn resolve_sort(
        &self,
        indexes: &[SortIndex],
        resource: &str,
    ) -> Result<Vec<FieldSort>, CompileError> {
        SortResolver::new(&self.catalog).resolve(indexes, resource)
    }

    /// Builds facet aggregations for a compiled query.
    pub fn build_facets<S: AsRef<str>>(
        &self,
        query: &Query,
        facets: &[S],
        resource: &str,
    ) -> Result<Vec<AggregationSpec>, CompileError> {
        FacetCompiler::new(&self.catalog).build(query, facets, resource)
    }

    /// Recovers browse pagination state from a compiled query.
    pub fn build_browse_context(
        &self,
        search: &SearchQuery,
        request: &BrowseRequest,
    ) -> Result<BrowseContext, CompileError> {
        BrowseContextBuilder::new(request).build(search)
    }

    /// Recovers call-number browse state, bounding ranges by the configured offset.
    pub fn build_call_number_browse_context(
        &self,
        search: &SearchQuery,
        request: &BrowseRequest,
    ) -> Result<BrowseContext, CompileError> {
        CallNumberBrowseBuilder::new(request, self.browse.call_number_range_offset).build(search)
    }
}

#[cfg(test)]
mod tests {
    use shelf_config::{FieldDescriptor, ResourceCatalog};
    use shelf_cql::Modifier;

    use super::*;
    use crate::{
        BoolQuery, MatchMode, RangeQuery, SortOrder, TermValue, encode_call_number, shelf_key,
        test_support,
    };

    /// Asserts the compiler can be shared across threads.
    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn compiler_is_send_and_sync() {
        assert_send_sync::<QueryCompiler>();
    }

    #[test]
    fn unknown_normalizer_is_rejected() {
        let mut field = FieldDescriptor::new("lccn", &[]);
        field.normalizer = Some("soundex".into());
        let resource = ResourceCatalog {
            name: "instance".into(),
            fields: [("lccn".to_string(), field)].into(),
            ..ResourceCatalog::default()
        };
        let err = QueryCompiler::new(
            Arc::new(FieldCatalog::new([resource])),
            Arc::new(NormalizationRegistry::standard().unwrap()),
            Arc::new(ComparatorDispatch::standard().unwrap()),
            BrowseSettings::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownNormalizer {
                resource: "instance".into(),
                field: "lccn".into(),
                name: "soundex".into()
            }
        );
    }

    #[test]
    fn compile_promotes_filters_and_resolves_sort() {
        let node = CqlNode::sort_by(
            CqlNode::and(
                CqlNode::term("title", "all", "dune"),
                CqlNode::term("languages", "=", "eng"),
            ),
            vec![SortIndex::new("title").with_modifier(Modifier::new("sort.descending"))],
        );
        let search = test_support::compiler()
            .compile_query(&node, "instance")
            .unwrap();
        assert_eq!(
            search.query,
            Query::Bool(BoolQuery {
                must: vec![Query::fulltext(vec!["title.*".into()], "dune", MatchMode::All)],
                filter: vec![Query::term("languages", "eng")],
                ..BoolQuery::default()
            })
        );
        assert_eq!(
            search.sort,
            vec![FieldSort::new("sort_title", SortOrder::Desc)]
        );
    }

    #[test]
    fn unsorted_root_has_no_sort_keys() {
        let search = test_support::compiler()
            .compile_query(&CqlNode::term("cql.allRecords", "=", "1"), "instance")
            .unwrap();
        assert_eq!(search, SearchQuery::new(Query::MatchAll));
    }

    #[test]
    fn compiled_filters_feed_facets() {
        let compiler = test_support::compiler();
        let node = CqlNode::and(
            CqlNode::term("title", "all", "dune"),
            CqlNode::or(
                CqlNode::term("genre", "=", "fiction"),
                CqlNode::term("genre", "=", "poetry"),
            ),
        );
        let search = compiler.compile_query(&node, "instance").unwrap();
        let aggs = compiler
            .build_facets(&search.query, &["genre:1"], "instance")
            .unwrap();
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].name(), "selected_genre");
    }

    #[test]
    fn browse_around_from_compiled_query() {
        let compiler = test_support::compiler();
        let node = CqlNode::and(
            CqlNode::or(
                CqlNode::term("shelfKey", "<", "PR 14"),
                CqlNode::term("shelfKey", ">=", "PR 14"),
            ),
            CqlNode::term("languages", "=", "eng"),
        );
        let search = compiler.compile_query(&node, "instance").unwrap();
        let request = BrowseRequest::new(node.to_cql_string(), "shelfKey", 10).with_preceding(4);
        let context = compiler.build_browse_context(&search, &request).unwrap();
        assert!(context.is_browsing_around());
        assert_eq!(context.anchor, TermValue::Text(shelf_key("PR 14")));
        assert_eq!(context.filters, vec![Query::term("languages", "eng")]);
        assert_eq!(context.limit(false), Some(4));
        assert_eq!(context.limit(true), Some(6));
    }

    #[test]
    fn call_number_browse_applies_configured_offset() {
        let compiler = test_support::compiler();
        let node = CqlNode::term("callNumber", ">=", "PR 9199.3");
        let search = compiler.compile_query(&node, "instance").unwrap();
        let request = BrowseRequest::new(node.to_cql_string(), "callNumber", 10);
        let context = compiler
            .build_call_number_browse_context(&search, &request)
            .unwrap();
        let anchor = encode_call_number("PR 9199.3");
        assert_eq!(context.anchor, TermValue::Long(anchor));
        assert_eq!(
            context.succeeding,
            Some(RangeQuery {
                field: "callNumber".into(),
                from: Some(TermValue::Long(anchor)),
                to: Some(TermValue::Long(anchor + 1000)),
                include_lower: true,
                include_upper: true,
            })
        );
    }

    #[test]
    fn sorted_browse_query_is_rejected() {
        let compiler = test_support::compiler();
        let node = CqlNode::sort_by(
            CqlNode::term("shelfKey", ">=", "PR"),
            vec![SortIndex::new("title")],
        );
        let search = compiler.compile_query(&node, "instance").unwrap();
        let request = BrowseRequest::new(node.to_cql_string(), "shelfKey", 10);
        assert!(matches!(
            compiler.build_browse_context(&search, &request),
            Err(CompileError::InvalidBrowseQuery { .. })
        ));
    }
}
