//! CQL abstract syntax tree.
//!
//! Represents parsed CQL expressions before compilation to search engine queries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A parsed CQL expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CqlNode {
    /// A single search clause: `index comparator term`.
    Term(TermNode),

    /// A binary boolean combination of two sub-expressions.
    Boolean {
        /// The boolean operator joining both sides.
        operator: BooleanOperator,
        /// Left operand.
        left: Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },

    /// Sort clause applied to the whole query (`... sortBy a b/sort.descending`).
    Sort {
        /// The query being sorted.
        subtree: Box<Self>,
        /// Sort keys in priority order.
        indexes: Vec<SortIndex>,
    },

    /// Prefix assignment mapping a short name to a context set URI.
    Prefix {
        /// Short prefix name, absent for the default context set.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Context set identifier.
        uri: String,
        /// Expression the prefix applies to.
        subtree: Box<Self>,
    },
}

/// A leaf search clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermNode {
    /// Field path (CQL index), e.g. `title` or `items.effectiveShelvingOrder`.
    pub index: String,
    /// Relation token, e.g. `=`, `==`, `all`, `<=`.
    pub comparator: String,
    /// Literal search value.
    pub term: String,
    /// Relation modifiers, e.g. `/string`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
}

/// Boolean operators appearing in a CQL tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOperator {
    /// Both sides must match.
    And,
    /// Either side must match.
    Or,
    /// Left side must match, right side must not.
    Not,
    /// Proximity between both sides.
    Prox,
}

/// A relation or sort modifier such as `/string` or `/sort.descending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// Modifier name.
    pub name: String,
    /// Optional comparator for valued modifiers (`/locale=en`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparator: Option<String>,
    /// Optional value for valued modifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// One key of a `sortBy` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortIndex {
    /// Field path to sort on.
    pub base: String,
    /// Sort modifiers, e.g. `/sort.descending`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
}

impl CqlNode {
    /// Creates a term clause.
    pub fn term(
        index: impl Into<String>,
        comparator: impl Into<String>,
        term: impl Into<String>,
    ) -> Self {
        Self::Term(TermNode::new(index, comparator, term))
    }

    /// Creates an `and` node.
    pub fn and(left: Self, right: Self) -> Self {
        Self::boolean(BooleanOperator::And, left, right)
    }

    /// Creates an `or` node.
    pub fn or(left: Self, right: Self) -> Self {
        Self::boolean(BooleanOperator::Or, left, right)
    }

    /// Creates a `not` node.
    pub fn not(left: Self, right: Self) -> Self {
        Self::boolean(BooleanOperator::Not, left, right)
    }

    /// Creates a boolean node with an explicit operator.
    pub fn boolean(operator: BooleanOperator, left: Self, right: Self) -> Self {
        Self::Boolean {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Wraps an expression in a `sortBy` clause.
    pub fn sort_by(subtree: Self, indexes: Vec<SortIndex>) -> Self {
        Self::Sort {
            subtree: Box::new(subtree),
            indexes,
        }
    }

    /// Formats the expression as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term(term) => writeln!(f, "{prefix}Term({})", term.to_cql_string()),
            Self::Boolean {
                operator,
                left,
                right,
            } => {
                writeln!(f, "{prefix}{}", operator.as_str().to_uppercase())?;
                left.fmt_tree(f, indent + 1)?;
                right.fmt_tree(f, indent + 1)
            }
            Self::Sort { subtree, indexes } => {
                let keys: Vec<String> = indexes.iter().map(SortIndex::to_cql_string).collect();
                writeln!(f, "{prefix}SortBy({})", keys.join(" "))?;
                subtree.fmt_tree(f, indent + 1)
            }
            Self::Prefix { name, uri, subtree } => {
                match name {
                    Some(name) => writeln!(f, "{prefix}Prefix({name} = {uri:?})")?,
                    None => writeln!(f, "{prefix}Prefix({uri:?})")?,
                }
                subtree.fmt_tree(f, indent + 1)
            }
        }
    }

    /// Formats the expression as canonical CQL text.
    ///
    /// Used in error messages and explain output; nested booleans are parenthesized.
    pub fn to_cql_string(&self) -> String {
        match self {
            Self::Term(term) => term.to_cql_string(),
            Self::Boolean {
                operator,
                left,
                right,
            } => format!(
                "{} {} {}",
                left.operand_string(),
                operator.as_str(),
                right.operand_string()
            ),
            Self::Sort { subtree, indexes } => {
                let keys: Vec<String> = indexes.iter().map(SortIndex::to_cql_string).collect();
                format!("{} sortBy {}", subtree.to_cql_string(), keys.join(" "))
            }
            Self::Prefix { name, uri, subtree } => match name {
                Some(name) => format!("> {name} = {} {}", quote(uri), subtree.to_cql_string()),
                None => format!("> {} {}", quote(uri), subtree.to_cql_string()),
            },
        }
    }

    /// Renders a boolean operand, parenthesizing anything that is not a term.
    fn operand_string(&self) -> String {
        match self {
            Self::Term(term) => term.to_cql_string(),
            other => format!("({})", other.to_cql_string()),
        }
    }
}

impl fmt::Display for CqlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

impl From<TermNode> for CqlNode {
    fn from(term: TermNode) -> Self {
        Self::Term(term)
    }
}

impl TermNode {
    /// Creates a term clause without modifiers.
    pub fn new(
        index: impl Into<String>,
        comparator: impl Into<String>,
        term: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            comparator: comparator.into(),
            term: term.into(),
            modifiers: Vec::new(),
        }
    }

    /// Adds a relation modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Returns true if a modifier with this name (case-insensitive) is present.
    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers
            .iter()
            .any(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Formats the clause as CQL text, e.g. `title =/string "dune"`.
    pub fn to_cql_string(&self) -> String {
        let modifiers: String = self.modifiers.iter().map(Modifier::to_cql_string).collect();
        format!(
            "{} {}{} {}",
            self.index,
            self.comparator,
            modifiers,
            quote(&self.term)
        )
    }
}

impl BooleanOperator {
    /// Returns the lowercase CQL keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Prox => "prox",
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Modifier {
    /// Creates a bare modifier such as `string`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comparator: None,
            value: None,
        }
    }

    /// Creates a valued modifier such as `locale=en`.
    pub fn with_value(
        name: impl Into<String>,
        comparator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            comparator: Some(comparator.into()),
            value: Some(value.into()),
        }
    }

    /// Formats the modifier as CQL text including the leading slash.
    pub fn to_cql_string(&self) -> String {
        match (&self.comparator, &self.value) {
            (Some(comparator), Some(value)) => format!("/{}{comparator}{value}", self.name),
            _ => format!("/{}", self.name),
        }
    }
}

impl SortIndex {
    /// Creates a sort key without modifiers.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            modifiers: Vec::new(),
        }
    }

    /// Adds a sort modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Formats the sort key as CQL text, e.g. `title/sort.descending`.
    pub fn to_cql_string(&self) -> String {
        let modifiers: String = self.modifiers.iter().map(Modifier::to_cql_string).collect();
        format!("{}{modifiers}", self.base)
    }
}

/// Quotes a CQL string literal, escaping embedded quotes.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}
