//! Boolean tree compilation.
//!
//! Walks the CQL tree, compiling leaves through the [`TermCompiler`] and combining results.
//! Left-leaning chains of the same operator are flattened into one clause list, and two
//! ranges on one field joined by AND collapse into a single range.

use log::debug;
use shelf_cql::{BooleanOperator, CqlNode};

use crate::{BoolQuery, CompileError, Occur, Query, RangeQuery, TermCompiler};

/// Compiles boolean trees.
pub struct BooleanCompiler<'a> {
    /// Leaf compiler.
    terms: TermCompiler<'a>,
}

impl<'a> BooleanCompiler<'a> {
    /// Creates a boolean compiler over a leaf compiler.
    pub fn new(terms: TermCompiler<'a>) -> Self {
        Self { terms }
    }

    /// Compiles a tree that contains no root-level sort.
    pub fn compile(&self, node: &CqlNode, resource: &str) -> Result<Query, CompileError> {
        match node {
            CqlNode::Term(term) => self.terms.compile(term, resource),
            CqlNode::Boolean {
                operator,
                left,
                right,
            } => self.compile_boolean(*operator, left, right, resource),
            CqlNode::Sort { .. } => Err(CompileError::UnsupportedFeature(
                "sortBy clause below the root of the query".to_string(),
            )),
            CqlNode::Prefix { uri, .. } => Err(CompileError::UnsupportedFeature(format!(
                "prefix assignment '{uri}'"
            ))),
        }
    }

    /// Compiles both operands and combines them.
    ///
    /// The operator is checked first so an unsupported operator is reported even when an
    /// operand would also fail.
    fn compile_boolean(
        &self,
        operator: BooleanOperator,
        left: &CqlNode,
        right: &CqlNode,
        resource: &str,
    ) -> Result<Query, CompileError> {
        let combine: fn(Query, Query) -> Query = match operator {
            BooleanOperator::And => combine_and,
            BooleanOperator::Or => combine_or,
            BooleanOperator::Not => combine_not,
            BooleanOperator::Prox => {
                return Err(CompileError::UnsupportedFeature(format!(
                    "boolean operator '{operator}'"
                )));
            }
        };
        let left = self.compile(left, resource)?;
        let right = self.compile(right, resource)?;
        Ok(combine(left, right))
    }
}

/// AND: collapses same-field ranges, otherwise flattens into `must`.
fn combine_and(left: Query, right: Query) -> Query {
    match (left, right) {
        (Query::Range(l), Query::Range(r)) if l.field == r.field => {
            Query::Range(collapse_ranges(l, r))
        }
        (left, right) => flatten(left, right, Occur::Must),
    }
}

/// OR: flattens into `should`.
fn combine_or(left: Query, right: Query) -> Query {
    flatten(left, right, Occur::Should)
}

/// NOT: left is required, right excluded.
fn combine_not(left: Query, right: Query) -> Query {
    Query::Bool(BoolQuery {
        must: vec![left],
        must_not: vec![right],
        ..BoolQuery::default()
    })
}

/// Appends to the left operand's list when it already holds two or more clauses,
/// otherwise starts a new boolean query with both operands.
fn flatten(left: Query, right: Query, occur: Occur) -> Query {
    match left {
        Query::Bool(mut query) if query.clauses(occur).len() >= 2 => {
            query.clauses_mut(occur).push(right);
            Query::Bool(query)
        }
        left => Query::Bool(BoolQuery::with(occur, [left, right])),
    }
}

/// Merges two ranges on one field.
///
/// If the left range has a lower bound it supplies the lower bound and the right range
/// the upper one; otherwise the roles are swapped.
fn collapse_ranges(left: RangeQuery, right: RangeQuery) -> RangeQuery {
    let (lower, upper) = if left.from.is_some() {
        (left, right)
    } else {
        (right, left)
    };
    if upper.to.is_none() || lower.from.is_none() {
        debug!(
            "ambiguous range collapse on '{}': both operands bound the same side",
            lower.field
        );
    }
    RangeQuery {
        field: lower.field,
        from: lower.from,
        to: upper.to,
        include_lower: lower.include_lower,
        include_upper: upper.include_upper,
    }
}

#[cfg(test)]
mod tests {
    use shelf_cql::{Modifier, SortIndex, TermNode};

    use super::*;
    use crate::{MatchMode, TermValue, test_support};

    /// Compiles a tree against the test catalog's instance resource.
    fn compile(node: &CqlNode) -> Result<Query, CompileError> {
        let tables = test_support::tables();
        BooleanCompiler::new(tables.terms()).compile(node, "instance")
    }

    #[test]
    fn and_chain_flattens_into_one_must_list() {
        let node = CqlNode::and(
            CqlNode::and(
                CqlNode::term("title", "all", "dune"),
                CqlNode::term("languages", "=", "eng"),
            ),
            CqlNode::term("genre", "=", "fiction"),
        );
        let query = compile(&node).unwrap();
        let must = &query.as_bool().unwrap().must;
        assert_eq!(must.len(), 3);
        assert!(must.iter().all(|q| q.as_bool().is_none()));
    }

    #[test]
    fn or_chain_flattens_into_one_should_list() {
        let node = CqlNode::or(
            CqlNode::or(
                CqlNode::term("genre", "=", "fiction"),
                CqlNode::term("genre", "=", "poetry"),
            ),
            CqlNode::term("genre", "=", "drama"),
        );
        let query = compile(&node).unwrap();
        assert_eq!(query.as_bool().unwrap().should.len(), 3);
        assert_eq!(query.disjunction_field(), Some("genre"));
    }

    #[test]
    fn mixed_operators_nest() {
        let node = CqlNode::and(
            CqlNode::or(
                CqlNode::term("genre", "=", "fiction"),
                CqlNode::term("genre", "=", "poetry"),
            ),
            CqlNode::term("languages", "=", "eng"),
        );
        let query = compile(&node).unwrap();
        let must = &query.as_bool().unwrap().must;
        assert_eq!(must.len(), 2);
        assert_eq!(must[0].disjunction_field(), Some("genre"));
    }

    #[test]
    fn same_field_ranges_collapse() {
        let node = CqlNode::and(
            CqlNode::term("holdingsCount", ">", "2"),
            CqlNode::term("holdingsCount", "<", "10"),
        );
        assert_eq!(
            compile(&node).unwrap(),
            Query::Range(RangeQuery {
                field: "holdingsCount".into(),
                from: Some(TermValue::Long(2)),
                to: Some(TermValue::Long(10)),
                include_lower: false,
                include_upper: false,
            })
        );

        let reversed = CqlNode::and(
            CqlNode::term("holdingsCount", "<=", "10"),
            CqlNode::term("holdingsCount", ">=", "2"),
        );
        assert_eq!(
            compile(&reversed).unwrap(),
            Query::Range(RangeQuery {
                field: "holdingsCount".into(),
                from: Some(TermValue::Long(2)),
                to: Some(TermValue::Long(10)),
                include_lower: true,
                include_upper: true,
            })
        );
    }

    #[test]
    fn ambiguous_collapse_keeps_left_precedence() {
        let node = CqlNode::and(
            CqlNode::term("holdingsCount", ">", "2"),
            CqlNode::term("holdingsCount", ">", "5"),
        );
        let query = compile(&node).unwrap();
        let range = query.as_range().unwrap();
        assert_eq!(range.from, Some(TermValue::Long(2)));
        assert_eq!(range.to, None);
    }

    #[test]
    fn ranges_on_different_fields_do_not_collapse() {
        let node = CqlNode::and(
            CqlNode::term("holdingsCount", ">", "2"),
            CqlNode::term("updatedDate", "<", "2024-01-01"),
        );
        assert_eq!(compile(&node).unwrap().as_bool().unwrap().must.len(), 2);
    }

    #[test]
    fn or_of_ranges_does_not_collapse() {
        let node = CqlNode::or(
            CqlNode::term("holdingsCount", ">", "2"),
            CqlNode::term("holdingsCount", "<", "1"),
        );
        assert_eq!(compile(&node).unwrap().as_bool().unwrap().should.len(), 2);
    }

    #[test]
    fn not_excludes_right_operand() {
        let node = CqlNode::not(
            CqlNode::term("title", "all", "dune"),
            CqlNode::term("languages", "=", "eng"),
        );
        let query = compile(&node).unwrap();
        let bool_query = query.as_bool().unwrap();
        assert_eq!(
            bool_query.must,
            vec![Query::fulltext(vec!["title.*".into()], "dune", MatchMode::All)]
        );
        assert_eq!(bool_query.must_not, vec![Query::term("languages", "eng")]);
    }

    #[test]
    fn proximity_is_unsupported_even_with_bad_operands() {
        let node = CqlNode::boolean(
            BooleanOperator::Prox,
            CqlNode::term("nosuchfield", "=", "a"),
            CqlNode::term("title", "=", "b"),
        );
        let err = compile(&node).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedFeature("boolean operator 'prox'".into())
        );
    }

    #[test]
    fn nested_sort_and_prefix_are_unsupported() {
        let nested = CqlNode::and(
            CqlNode::sort_by(
                CqlNode::term("title", "=", "a"),
                vec![SortIndex::new("title")],
            ),
            CqlNode::term("title", "=", "b"),
        );
        assert!(matches!(
            compile(&nested),
            Err(CompileError::UnsupportedFeature(_))
        ));

        let prefix = CqlNode::Prefix {
            name: Some("dc".into()),
            uri: "info:srw/cql-context-set/1/dc-v1.1".into(),
            subtree: Box::new(CqlNode::term("title", "=", "a")),
        };
        assert!(matches!(
            compile(&prefix),
            Err(CompileError::UnsupportedFeature(ref m)) if m.contains("prefix")
        ));
    }

    #[test]
    fn operand_errors_propagate() {
        let node = CqlNode::or(
            CqlNode::term("title", "=", "a"),
            CqlNode::Term(TermNode::new("title", "near", "b").with_modifier(Modifier::new("x"))),
        );
        assert!(matches!(
            compile(&node),
            Err(CompileError::UnsupportedFeature(ref m)) if m.contains("near")
        ));
    }
}
