//! CQL expression tree for shelf.
//!
//! The tree is produced by an external CQL parser and consumed by `shelf-compile`:
//!
//! - **Terms**: `title = "war and peace"` - field, comparator, value and modifiers
//! - **Booleans**: `a and b`, `a or b`, `a not b` (and `prox`, which is never compiled)
//! - **Sort**: `... sortBy title/sort.descending` - only ever wraps the root
//! - **Prefixes**: `> dc = "info:srw/..." ...` - carried through so they can be rejected
//!
//! Trees can be built in code with the helper constructors, or deserialized from JSON
//! when they are handed over by a parser running elsewhere.
//!
//! # Example
//!
//! ```
//! use shelf_cql::CqlNode;
//!
//! let expr = CqlNode::and(
//!     CqlNode::term("title", "all", "semantic web"),
//!     CqlNode::term("languages", "==", "eng"),
//! );
//! assert_eq!(
//!     expr.to_cql_string(),
//!     r#"title all "semantic web" and languages == "eng""#
//! );
//! ```

#![warn(missing_docs)]

mod ast;

pub use ast::{BooleanOperator, CqlNode, Modifier, SortIndex, TermNode};
