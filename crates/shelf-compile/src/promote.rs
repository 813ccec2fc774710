//! Filter promotion.
//!
//! Exact constraints on filter-capable fields do not need to contribute to relevance.
//! After a tree is compiled, such clauses are moved from scoring context into the
//! boolean query's `filter` list.

use shelf_config::{Capability, FieldCatalog};

use crate::{BoolQuery, Query};

/// Moves filter-capable clauses of a compiled query into filter context.
///
/// Qualifying clauses are term queries on a filter field and disjunctions of such terms
/// on one filter field. A query that qualifies as a whole is wrapped as the only filter
/// of a new boolean query; a boolean query has qualifying `must` clauses moved, in order,
/// to the end of its `filter` list. Applying promotion twice changes nothing.
pub fn promote_filters(query: Query, catalog: &FieldCatalog, resource: &str) -> Query {
    if is_filter_clause(&query, catalog, resource) {
        return query.into_filter();
    }
    match query {
        Query::Bool(bool_query) => Query::Bool(promote_must(bool_query, catalog, resource)),
        other => other,
    }
}

/// Partitions `must` into retained clauses and promoted filters.
fn promote_must(mut query: BoolQuery, catalog: &FieldCatalog, resource: &str) -> BoolQuery {
    let (promoted, retained): (Vec<Query>, Vec<Query>) = query
        .must
        .into_iter()
        .partition(|clause| is_filter_clause(clause, catalog, resource));
    query.must = retained;
    query.filter.extend(promoted);
    query
}

/// True for a term or single-field term disjunction on a filter-capable field.
fn is_filter_clause(query: &Query, catalog: &FieldCatalog, resource: &str) -> bool {
    let field = match query {
        Query::Term { field, .. } => Some(field.as_str()),
        Query::Bool(_) => query.disjunction_field(),
        _ => None,
    };
    field.is_some_and(|field| {
        catalog
            .describe_with(resource, field, Capability::Filter)
            .is_some()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchMode, Occur, RangeQuery, test_support};

    /// Promotes against the test catalog's instance resource.
    fn promote(query: Query) -> Query {
        let tables = test_support::tables();
        promote_filters(query, &tables.catalog, "instance")
    }

    /// A scoring full-text clause.
    fn title() -> Query {
        Query::fulltext(vec!["title.*".into()], "dune", MatchMode::All)
    }

    #[test]
    fn whole_query_term_is_wrapped() {
        let query = promote(Query::term("languages", "eng"));
        assert_eq!(query, Query::term("languages", "eng").into_filter());
    }

    #[test]
    fn disjunction_filter_round_trip() {
        let disjunction = Query::Bool(BoolQuery::with(
            Occur::Should,
            [Query::term("genre", "a"), Query::term("genre", "b")],
        ));
        let promoted = promote(disjunction.clone());
        assert_eq!(
            promoted,
            Query::Bool(BoolQuery::with(Occur::Filter, [disjunction]))
        );
    }

    #[test]
    fn must_clauses_are_partitioned_in_order() {
        let query = Query::Bool(BoolQuery::with(
            Occur::Must,
            [
                Query::term("languages", "eng"),
                title(),
                Query::term("genre", "fiction"),
                Query::Range(RangeQuery::lower_bounded("holdingsCount", 2_i64, true)),
            ],
        ));
        let promoted = promote(query);
        let bool_query = promoted.as_bool().unwrap();
        assert_eq!(
            bool_query.must,
            vec![
                title(),
                Query::Range(RangeQuery::lower_bounded("holdingsCount", 2_i64, true))
            ]
        );
        assert_eq!(
            bool_query.filter,
            vec![
                Query::term("languages", "eng"),
                Query::term("genre", "fiction")
            ]
        );
    }

    #[test]
    fn non_filter_fields_stay_scored() {
        let query = Query::term("plain_title", "Dune");
        assert_eq!(promote(query.clone()), query);

        let mixed = Query::Bool(BoolQuery::with(
            Occur::Should,
            [Query::term("genre", "a"), Query::term("languages", "eng")],
        ));
        assert_eq!(promote(mixed.clone()), mixed);
    }

    #[test]
    fn should_and_must_not_are_left_alone() {
        let mut query = BoolQuery::with(Occur::Must, [title()]);
        query.must_not.push(Query::term("languages", "eng"));
        let query = Query::Bool(query);
        assert_eq!(promote(query.clone()), query);
    }

    #[test]
    fn promotion_is_idempotent() {
        let queries = [
            Query::term("languages", "eng"),
            Query::Bool(BoolQuery::with(
                Occur::Should,
                [Query::term("genre", "a"), Query::term("genre", "b")],
            )),
            Query::Bool(BoolQuery::with(
                Occur::Must,
                [title(), Query::term("genre", "fiction")],
            )),
            title(),
            Query::MatchAll,
        ];
        for query in queries {
            let once = promote(query);
            let twice = promote(once.clone());
            assert_eq!(once, twice);
        }
    }
}
