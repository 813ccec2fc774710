//! Compiled query model.
//!
//! The output of compilation: an engine-neutral query tree with must/should/mustNot/filter
//! semantics, plus the sort specification resolved from a root `sortBy` clause.

use std::fmt;

use serde::Serialize;

/// A literal value carried by a compiled query.
///
/// Normalizers may turn textual input into numbers (call numbers become longs), so values
/// are either text or a 64-bit integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TermValue {
    /// Textual value.
    Text(String),
    /// Integer value.
    Long(i64),
}

impl TermValue {
    /// Returns the text if this is a textual value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Long(_) => None,
        }
    }

    /// Returns the integer if this is a numeric value.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for TermValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Long(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for TermValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TermValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for TermValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

/// How the words of a full-text value must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every word must match.
    All,
    /// At least one word must match.
    Any,
    /// Words must match adjacently and in order.
    Phrase,
}

/// A range constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeQuery {
    /// Field being constrained.
    pub field: String,
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<TermValue>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<TermValue>,
    /// Whether the lower bound itself matches.
    pub include_lower: bool,
    /// Whether the upper bound itself matches.
    pub include_upper: bool,
}

impl RangeQuery {
    /// Creates a range bounded below.
    pub fn lower_bounded(
        field: impl Into<String>,
        value: impl Into<TermValue>,
        inclusive: bool,
    ) -> Self {
        Self {
            field: field.into(),
            from: Some(value.into()),
            to: None,
            include_lower: inclusive,
            include_upper: true,
        }
    }

    /// Creates a range bounded above.
    pub fn upper_bounded(
        field: impl Into<String>,
        value: impl Into<TermValue>,
        inclusive: bool,
    ) -> Self {
        Self {
            field: field.into(),
            from: None,
            to: Some(value.into()),
            include_lower: true,
            include_upper: inclusive,
        }
    }

    /// True if only the upper bound is set.
    pub fn is_upper_bounded_only(&self) -> bool {
        self.from.is_none() && self.to.is_some()
    }

    /// True if only the lower bound is set.
    pub fn is_lower_bounded_only(&self) -> bool {
        self.from.is_some() && self.to.is_none()
    }

    /// The bound browse navigation pivots on: `from` if present, else `to`.
    pub fn anchor(&self) -> Option<&TermValue> {
        self.from.as_ref().or(self.to.as_ref())
    }
}

/// Clause lists of a boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// Required and scored.
    Must,
    /// Optional, at least one matches.
    Should,
    /// Excluded.
    MustNot,
    /// Required, not scored.
    Filter,
}

/// A boolean combination of clauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    /// Required clauses contributing to relevance.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,
    /// Alternative clauses.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
    /// Excluded clauses.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Query>,
    /// Required clauses applied without scoring.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Query>,
}

impl BoolQuery {
    /// Creates a boolean query with the given clauses in one list.
    pub fn with(occur: Occur, clauses: impl IntoIterator<Item = Query>) -> Self {
        let mut query = Self::default();
        query.clauses_mut(occur).extend(clauses);
        query
    }

    /// Returns the clause list for an occurrence.
    pub fn clauses(&self, occur: Occur) -> &[Query] {
        match occur {
            Occur::Must => &self.must,
            Occur::Should => &self.should,
            Occur::MustNot => &self.must_not,
            Occur::Filter => &self.filter,
        }
    }

    /// Returns the mutable clause list for an occurrence.
    pub fn clauses_mut(&mut self, occur: Occur) -> &mut Vec<Query> {
        match occur {
            Occur::Must => &mut self.must,
            Occur::Should => &mut self.should,
            Occur::MustNot => &mut self.must_not,
            Occur::Filter => &mut self.filter,
        }
    }
}

/// A compiled, engine-neutral query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Matches every document.
    MatchAll,
    /// Exact value match on one field.
    Term {
        /// Field to match.
        field: String,
        /// Value to match.
        value: TermValue,
    },
    /// Range constraint.
    Range(RangeQuery),
    /// Pattern match with `*` wildcards.
    Wildcard {
        /// Field to match.
        field: String,
        /// Pattern including `*` markers.
        pattern: String,
    },
    /// Analyzed full-text match over one or more fields.
    Fulltext {
        /// Searched fields; `path.*` covers every language variant.
        fields: Vec<String>,
        /// Query text.
        value: String,
        /// Word matching mode.
        mode: MatchMode,
    },
    /// Boolean combination.
    Bool(BoolQuery),
    /// Relevance-weighted wrapper.
    Scored {
        /// Wrapped query.
        query: Box<Self>,
        /// Score multiplier.
        boost: f32,
    },
}

impl Query {
    /// Creates a term query.
    pub fn term(field: impl Into<String>, value: impl Into<TermValue>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a full-text query.
    pub fn fulltext(fields: Vec<String>, value: impl Into<String>, mode: MatchMode) -> Self {
        Self::Fulltext {
            fields,
            value: value.into(),
            mode,
        }
    }

    /// Wraps a query with a score multiplier.
    pub fn scored(query: Self, boost: f32) -> Self {
        Self::Scored {
            query: Box::new(query),
            boost,
        }
    }

    /// Wraps a query as the only entry of a boolean filter list.
    pub fn into_filter(self) -> Self {
        Self::Bool(BoolQuery::with(Occur::Filter, [self]))
    }

    /// Returns the field and value of a term query.
    pub fn as_term(&self) -> Option<(&str, &TermValue)> {
        match self {
            Self::Term { field, value } => Some((field, value)),
            _ => None,
        }
    }

    /// Returns the range of a range query.
    pub fn as_range(&self) -> Option<&RangeQuery> {
        match self {
            Self::Range(range) => Some(range),
            _ => None,
        }
    }

    /// Returns the boolean query of a boolean node.
    pub fn as_bool(&self) -> Option<&BoolQuery> {
        match self {
            Self::Bool(query) => Some(query),
            _ => None,
        }
    }

    /// If this is a pure disjunction of term queries on one field, returns that field.
    ///
    /// The `should` list must be non-empty and the `must`, `mustNot` and `filter` lists
    /// empty.
    pub fn disjunction_field(&self) -> Option<&str> {
        let query = self.as_bool()?;
        if query.should.is_empty()
            || !query.must.is_empty()
            || !query.must_not.is_empty()
            || !query.filter.is_empty()
        {
            return None;
        }
        let (first, _) = query.should.first()?.as_term()?;
        query
            .should
            .iter()
            .all(|clause| clause.as_term().is_some_and(|(field, _)| field == first))
            .then_some(first)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// Which value of a multi-valued field a sort uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Smallest value of the collection.
    Min,
    /// Largest value of the collection.
    Max,
}

impl SortOrder {
    /// The collection mode that keeps this order stable.
    pub fn collection_mode(self) -> SortMode {
        match self {
            Self::Asc => SortMode::Min,
            Self::Desc => SortMode::Max,
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSort {
    /// Engine field to sort on.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
    /// Collection aggregation, for multi-valued sort fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SortMode>,
}

impl FieldSort {
    /// Creates a sort on a single-valued field.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
            mode: None,
        }
    }
}

/// The result of compiling a root expression: query plus sort keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    /// Compiled query.
    pub query: Query,
    /// Sort keys in priority order; empty when the expression had no `sortBy`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<FieldSort>,
}

impl SearchQuery {
    /// Creates an unsorted search query.
    pub fn new(query: Query) -> Self {
        Self {
            query,
            sort: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjunction_field_requires_single_field_terms() {
        let same = Query::Bool(BoolQuery::with(
            Occur::Should,
            [Query::term("genre", "fiction"), Query::term("genre", "poetry")],
        ));
        assert_eq!(same.disjunction_field(), Some("genre"));

        let mixed = Query::Bool(BoolQuery::with(
            Occur::Should,
            [Query::term("genre", "fiction"), Query::term("languages", "eng")],
        ));
        assert_eq!(mixed.disjunction_field(), None);

        let mut with_must = BoolQuery::with(Occur::Should, [Query::term("genre", "fiction")]);
        with_must.must.push(Query::MatchAll);
        assert_eq!(Query::Bool(with_must).disjunction_field(), None);

        assert_eq!(Query::Bool(BoolQuery::default()).disjunction_field(), None);
    }

    #[test]
    fn range_shapes() {
        let preceding = RangeQuery::upper_bounded("callNumber", 10_i64, false);
        assert!(preceding.is_upper_bounded_only());
        assert_eq!(preceding.anchor(), Some(&TermValue::Long(10)));

        let succeeding = RangeQuery::lower_bounded("callNumber", 10_i64, true);
        assert!(succeeding.is_lower_bounded_only());
        assert!(!succeeding.is_upper_bounded_only());
    }

    #[test]
    fn serializes_engine_neutral_json() {
        let query = Query::term("languages", "eng").into_filter();
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"bool": {"filter": [{"term": {"field": "languages", "value": "eng"}}]}})
        );
        assert_eq!(
            serde_json::to_value(TermValue::Long(7)).unwrap(),
            serde_json::json!(7)
        );
    }
}
