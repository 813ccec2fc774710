//! Browse context reconstruction.
//!
//! Browse endpoints page through an ordered index around an anchor value. The request
//! arrives as an ordinary query; this module recovers the direction, anchor and limits
//! from the shape of the compiled query. Accepted shapes:
//!
//! - a single range on the target field, bounded on one side
//! - a boolean query with one `must` range and filters
//! - a boolean query whose `should` holds one preceding and one succeeding range with a
//!   common anchor (browsing around), optionally wrapped in `must` with filters

mod call_number;

use serde::Serialize;

pub use call_number::CallNumberBrowseBuilder;

use crate::{BoolQuery, CompileError, Query, RangeQuery, SearchQuery, TermValue};

/// Parameters of a browse request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    /// Canonical text of the query, quoted in errors.
    pub query: String,
    /// Field the browse pages over.
    pub target_field: String,
    /// Total number of records requested.
    pub limit: usize,
    /// Records wanted before the anchor when browsing around it.
    pub preceding_records_count: Option<usize>,
}

impl BrowseRequest {
    /// Creates a request with no explicit preceding count.
    pub fn new(query: impl Into<String>, target_field: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            target_field: target_field.into(),
            limit,
            preceding_records_count: None,
        }
    }

    /// Sets the number of records wanted before the anchor.
    pub fn with_preceding(mut self, count: usize) -> Self {
        self.preceding_records_count = Some(count);
        self
    }
}

/// Pagination state recovered from a browse query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowseContext {
    /// Range of records before the anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preceding: Option<RangeQuery>,
    /// Range of records after the anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub succeeding: Option<RangeQuery>,
    /// Filters applied in both directions.
    pub filters: Vec<Query>,
    /// Value the browse pivots on.
    pub anchor: TermValue,
    /// Records to fetch before the anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preceding_limit: Option<usize>,
    /// Records to fetch after the anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub succeeding_limit: Option<usize>,
}

impl BrowseContext {
    /// True when records on both sides of the anchor are requested.
    pub fn is_browsing_around(&self) -> bool {
        self.preceding.is_some() && self.succeeding.is_some()
    }

    /// The succeeding range when `forward`, else the preceding one.
    pub fn range(&self, forward: bool) -> Option<&RangeQuery> {
        if forward {
            self.succeeding.as_ref()
        } else {
            self.preceding.as_ref()
        }
    }

    /// The limit for one direction.
    pub fn limit(&self, forward: bool) -> Option<usize> {
        if forward {
            self.succeeding_limit
        } else {
            self.preceding_limit
        }
    }

    /// Whether the anchor value itself falls inside the range for one direction.
    pub fn is_anchor_included(&self, forward: bool) -> bool {
        match self.range(forward) {
            Some(range) if forward => range.include_lower,
            Some(range) => range.include_upper,
            None => false,
        }
    }

    /// Bounds the open side of each range by `offset` around a numeric anchor.
    ///
    /// The preceding range starts at `anchor - offset` (never below zero); the succeeding
    /// range ends at `anchor + offset` (saturating). Text anchors are left unchanged.
    #[must_use]
    pub fn with_range_offset(mut self, offset: u64) -> Self {
        let Some(anchor) = self.anchor.as_long() else {
            return self;
        };
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        if let Some(preceding) = &mut self.preceding {
            preceding.from = Some(TermValue::Long(anchor.saturating_sub(offset).max(0)));
        }
        if let Some(succeeding) = &mut self.succeeding {
            succeeding.to = Some(TermValue::Long(anchor.saturating_add(offset)));
        }
        self
    }
}

/// Recovers a [`BrowseContext`] from a compiled query.
pub struct BrowseContextBuilder<'r> {
    /// Request parameters.
    request: &'r BrowseRequest,
}

impl<'r> BrowseContextBuilder<'r> {
    /// Creates a builder for one request.
    pub fn new(request: &'r BrowseRequest) -> Self {
        Self { request }
    }

    /// Matches the compiled query against the accepted browse shapes.
    pub fn build(&self, search: &SearchQuery) -> Result<BrowseContext, CompileError> {
        if !search.sort.is_empty() {
            return Err(self.invalid("sortBy is not allowed in a browse query"));
        }
        match &search.query {
            Query::Range(range) => self.one_direction(range, Vec::new()),
            Query::Bool(query) => self.from_bool(query),
            _ => Err(self.invalid(format!(
                "expected a range query on '{}'",
                self.request.target_field
            ))),
        }
    }

    /// Matches a top-level boolean query.
    fn from_bool(&self, query: &BoolQuery) -> Result<BrowseContext, CompileError> {
        if !query.must_not.is_empty() {
            return Err(self.invalid("negated clauses are not allowed in a browse query"));
        }
        if query.must.is_empty() {
            return self.around(query, Vec::new());
        }
        if query.filter.is_empty() || !query.should.is_empty() {
            return Err(self.invalid("unexpected clauses next to the browse range"));
        }
        match query.must.as_slice() {
            [Query::Range(range)] => self.one_direction(range, query.filter.clone()),
            [Query::Bool(inner)] => self.around(inner, query.filter.clone()),
            _ => Err(self.invalid("expected exactly one browse range")),
        }
    }

    /// Builds a context for a range bounded on one side.
    fn one_direction(
        &self,
        range: &RangeQuery,
        filters: Vec<Query>,
    ) -> Result<BrowseContext, CompileError> {
        self.check_field(range)?;
        let limit = Some(self.request.limit);
        match (&range.from, &range.to) {
            (None, Some(to)) => Ok(BrowseContext {
                preceding: Some(range.clone()),
                succeeding: None,
                filters,
                anchor: to.clone(),
                preceding_limit: limit,
                succeeding_limit: None,
            }),
            (Some(from), None) => Ok(BrowseContext {
                preceding: None,
                succeeding: Some(range.clone()),
                filters,
                anchor: from.clone(),
                preceding_limit: None,
                succeeding_limit: limit,
            }),
            _ => Err(self.invalid("range must be bounded on exactly one side")),
        }
    }

    /// Builds a context for browsing around an anchor.
    ///
    /// `filters` come from an enclosing query and precede the query's own filters.
    fn around(
        &self,
        query: &BoolQuery,
        mut filters: Vec<Query>,
    ) -> Result<BrowseContext, CompileError> {
        if !query.must.is_empty() || !query.must_not.is_empty() {
            return Err(self.invalid("unexpected clauses next to the browse ranges"));
        }
        let [Query::Range(first), Query::Range(second)] = query.should.as_slice() else {
            return Err(self.invalid("browsing around requires exactly two ranges"));
        };
        self.check_field(first)?;
        self.check_field(second)?;
        if first.anchor() != second.anchor() {
            return Err(self.invalid("anchors must match"));
        }

        let (preceding, succeeding) = if first.is_upper_bounded_only() {
            (first, second)
        } else {
            (second, first)
        };
        if !preceding.is_upper_bounded_only() || !succeeding.is_lower_bounded_only() {
            return Err(self.invalid(
                "browsing around requires one preceding and one succeeding range",
            ));
        }
        let Some(anchor) = preceding.anchor() else {
            return Err(self.invalid("browse range has no anchor"));
        };

        let limit = self.request.limit;
        let preceding_limit = match self.request.preceding_records_count {
            Some(count) if count > limit => {
                return Err(self.invalid(format!(
                    "preceding records count {count} exceeds limit {limit}"
                )));
            }
            Some(count) => count,
            None => limit / 2,
        };
        filters.extend(query.filter.iter().cloned());

        Ok(BrowseContext {
            preceding: Some(preceding.clone()),
            succeeding: Some(succeeding.clone()),
            filters,
            anchor: anchor.clone(),
            preceding_limit: Some(preceding_limit),
            succeeding_limit: Some(limit - preceding_limit),
        })
    }

    /// Rejects ranges on fields other than the browse target.
    fn check_field(&self, range: &RangeQuery) -> Result<(), CompileError> {
        if range.field == self.request.target_field {
            Ok(())
        } else {
            Err(self.invalid(format!(
                "range on '{}' does not match browse field '{}'",
                range.field, self.request.target_field
            )))
        }
    }

    /// An `InvalidBrowseQuery` error for this request.
    fn invalid(&self, reason: impl Into<String>) -> CompileError {
        CompileError::InvalidBrowseQuery {
            reason: reason.into(),
            query: self.request.query.clone(),
        }
    }
}
