//! Built-in comparator strategies.

use shelf_cql::Modifier;

use super::{FulltextTarget, GroupMember, TermQueryBuilder, search_fields};
use crate::{BoolQuery, CompileError, MatchMode, Occur, Query, RangeQuery, TermValue};

/// Relation modifier forcing literal (untokenized) matching.
const STRING_MODIFIER: &str = "string";

/// True if the `string` relation modifier is present.
fn is_literal(modifiers: &[Modifier]) -> bool {
    modifiers
        .iter()
        .any(|m| m.name.eq_ignore_ascii_case(STRING_MODIFIER))
}

/// One term query per member, combined as a disjunction.
fn term_disjunction(value: &TermValue, members: &[GroupMember]) -> Query {
    Query::Bool(BoolQuery::with(
        Occur::Should,
        members
            .iter()
            .map(|member| Query::term(member.term_level_field(), value.clone())),
    ))
}

/// Splits a textual value into words; numeric values are a single word.
fn words(value: &TermValue) -> Vec<TermValue> {
    match value {
        TermValue::Text(text) => text
            .split_whitespace()
            .map(|word| TermValue::Text(word.to_string()))
            .collect(),
        TermValue::Long(_) => vec![value.clone()],
    }
}

/// Term queries for every word, combined in `occur`; a single word stays a plain term.
fn word_terms(value: &TermValue, field: &str, occur: Occur) -> Query {
    let mut terms: Vec<Query> = words(value)
        .into_iter()
        .map(|word| Query::term(field, word))
        .collect();
    if terms.len() == 1 {
        return terms.remove(0);
    }
    if terms.is_empty() {
        return Query::term(field, value.clone());
    }
    Query::Bool(BoolQuery::with(occur, terms))
}

/// `=`: analyzed match of all words; exact term on untokenized fields.
#[derive(Debug, Clone, Copy)]
pub struct EqualBuilder;

impl TermQueryBuilder for EqualBuilder {
    fn name(&self) -> &'static str {
        "equal"
    }

    fn comparators(&self) -> &'static [&'static str] {
        &["="]
    }

    fn multi_field_query(
        &self,
        value: &TermValue,
        members: &[GroupMember],
    ) -> Result<Query, CompileError> {
        Ok(Query::fulltext(search_fields(members), value.to_string(), MatchMode::All))
    }

    fn fulltext_query(
        &self,
        value: &TermValue,
        target: &FulltextTarget<'_>,
        modifiers: &[Modifier],
    ) -> Result<Query, CompileError> {
        if is_literal(modifiers) {
            return Ok(Query::term(target.literal_field(), value.clone()));
        }
        Ok(Query::fulltext(
            target.search_fields(),
            value.to_string(),
            MatchMode::All,
        ))
    }

    fn term_level_query(&self, value: &TermValue, field: &str) -> Result<Query, CompileError> {
        Ok(Query::term(field, value.clone()))
    }
}

/// `==`: whole-value match against untokenized fields.
#[derive(Debug, Clone, Copy)]
pub struct ExactBuilder;

impl TermQueryBuilder for ExactBuilder {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn comparators(&self) -> &'static [&'static str] {
        &["=="]
    }

    fn multi_field_query(
        &self,
        value: &TermValue,
        members: &[GroupMember],
    ) -> Result<Query, CompileError> {
        Ok(term_disjunction(value, members))
    }

    fn fulltext_query(
        &self,
        value: &TermValue,
        target: &FulltextTarget<'_>,
        _modifiers: &[Modifier],
    ) -> Result<Query, CompileError> {
        Ok(Query::term(target.literal_field(), value.clone()))
    }

    fn term_level_query(&self, value: &TermValue, field: &str) -> Result<Query, CompileError> {
        Ok(Query::term(field, value.clone()))
    }
}

/// `all`: every word must match.
#[derive(Debug, Clone, Copy)]
pub struct AllBuilder;

impl TermQueryBuilder for AllBuilder {
    fn name(&self) -> &'static str {
        "all"
    }

    fn comparators(&self) -> &'static [&'static str] {
        &["all"]
    }

    fn multi_field_query(
        &self,
        value: &TermValue,
        members: &[GroupMember],
    ) -> Result<Query, CompileError> {
        Ok(Query::fulltext(search_fields(members), value.to_string(), MatchMode::All))
    }

    fn fulltext_query(
        &self,
        value: &TermValue,
        target: &FulltextTarget<'_>,
        _modifiers: &[Modifier],
    ) -> Result<Query, CompileError> {
        Ok(Query::fulltext(
            target.search_fields(),
            value.to_string(),
            MatchMode::All,
        ))
    }

    fn term_level_query(&self, value: &TermValue, field: &str) -> Result<Query, CompileError> {
        Ok(word_terms(value, field, Occur::Must))
    }
}

/// `any`: at least one word must match.
#[derive(Debug, Clone, Copy)]
pub struct AnyBuilder;

impl TermQueryBuilder for AnyBuilder {
    fn name(&self) -> &'static str {
        "any"
    }

    fn comparators(&self) -> &'static [&'static str] {
        &["any"]
    }

    fn multi_field_query(
        &self,
        value: &TermValue,
        members: &[GroupMember],
    ) -> Result<Query, CompileError> {
        Ok(Query::fulltext(search_fields(members), value.to_string(), MatchMode::Any))
    }

    fn fulltext_query(
        &self,
        value: &TermValue,
        target: &FulltextTarget<'_>,
        _modifiers: &[Modifier],
    ) -> Result<Query, CompileError> {
        Ok(Query::fulltext(
            target.search_fields(),
            value.to_string(),
            MatchMode::Any,
        ))
    }

    fn term_level_query(&self, value: &TermValue, field: &str) -> Result<Query, CompileError> {
        Ok(word_terms(value, field, Occur::Should))
    }
}

/// `adj`: words must appear adjacently, in order.
#[derive(Debug, Clone, Copy)]
pub struct AdjBuilder;

impl TermQueryBuilder for AdjBuilder {
    fn name(&self) -> &'static str {
        "adj"
    }

    fn comparators(&self) -> &'static [&'static str] {
        &["adj"]
    }

    fn multi_field_query(
        &self,
        value: &TermValue,
        members: &[GroupMember],
    ) -> Result<Query, CompileError> {
        Ok(Query::fulltext(
            search_fields(members),
            value.to_string(),
            MatchMode::Phrase,
        ))
    }

    fn fulltext_query(
        &self,
        value: &TermValue,
        target: &FulltextTarget<'_>,
        _modifiers: &[Modifier],
    ) -> Result<Query, CompileError> {
        Ok(Query::fulltext(
            target.search_fields(),
            value.to_string(),
            MatchMode::Phrase,
        ))
    }

    fn term_level_query(&self, value: &TermValue, field: &str) -> Result<Query, CompileError> {
        Ok(Query::term(field, value.clone()))
    }
}

/// `<>`: excludes documents matching the value.
#[derive(Debug, Clone, Copy)]
pub struct NotEqualBuilder;

impl NotEqualBuilder {
    /// Wraps a query as the only excluded clause.
    fn exclude(query: Query) -> Query {
        Query::Bool(BoolQuery::with(Occur::MustNot, [query]))
    }
}

impl TermQueryBuilder for NotEqualBuilder {
    fn name(&self) -> &'static str {
        "not-equal"
    }

    fn comparators(&self) -> &'static [&'static str] {
        &["<>"]
    }

    fn multi_field_query(
        &self,
        value: &TermValue,
        members: &[GroupMember],
    ) -> Result<Query, CompileError> {
        Ok(Self::exclude(Query::fulltext(
            search_fields(members),
            value.to_string(),
            MatchMode::All,
        )))
    }

    fn fulltext_query(
        &self,
        value: &TermValue,
        target: &FulltextTarget<'_>,
        _modifiers: &[Modifier],
    ) -> Result<Query, CompileError> {
        Ok(Self::exclude(Query::fulltext(
            target.search_fields(),
            value.to_string(),
            MatchMode::All,
        )))
    }

    fn term_level_query(&self, value: &TermValue, field: &str) -> Result<Query, CompileError> {
        Ok(Self::exclude(Query::term(field, value.clone())))
    }
}

/// Which side of the value a range comparator selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// `>`
    GreaterThan,
    /// `>=`
    AtLeast,
    /// `<`
    LessThan,
    /// `<=`
    AtMost,
}

/// Relative comparators, one instance per bound.
#[derive(Debug, Clone, Copy)]
pub struct RangeBuilder {
    /// Bound produced by this instance.
    bound: RangeBound,
}

impl RangeBuilder {
    /// Creates the strategy for one relative comparator.
    pub fn new(bound: RangeBound) -> Self {
        Self { bound }
    }

    /// Builds the range on a field.
    fn range(&self, field: &str, value: &TermValue) -> Query {
        let value = value.clone();
        Query::Range(match self.bound {
            RangeBound::GreaterThan => RangeQuery::lower_bounded(field, value, false),
            RangeBound::AtLeast => RangeQuery::lower_bounded(field, value, true),
            RangeBound::LessThan => RangeQuery::upper_bounded(field, value, false),
            RangeBound::AtMost => RangeQuery::upper_bounded(field, value, true),
        })
    }
}

impl TermQueryBuilder for RangeBuilder {
    fn name(&self) -> &'static str {
        match self.bound {
            RangeBound::GreaterThan => "greater-than",
            RangeBound::AtLeast => "at-least",
            RangeBound::LessThan => "less-than",
            RangeBound::AtMost => "at-most",
        }
    }

    fn comparators(&self) -> &'static [&'static str] {
        match self.bound {
            RangeBound::GreaterThan => &[">"],
            RangeBound::AtLeast => &[">="],
            RangeBound::LessThan => &["<"],
            RangeBound::AtMost => &["<="],
        }
    }

    fn fulltext_query(
        &self,
        value: &TermValue,
        target: &FulltextTarget<'_>,
        _modifiers: &[Modifier],
    ) -> Result<Query, CompileError> {
        Ok(self.range(target.path, value))
    }

    fn term_level_query(&self, value: &TermValue, field: &str) -> Result<Query, CompileError> {
        Ok(self.range(field, value))
    }
}

/// Pattern matching; selected automatically for values containing `*`.
#[derive(Debug, Clone, Copy)]
pub struct WildcardBuilder;

impl TermQueryBuilder for WildcardBuilder {
    fn name(&self) -> &'static str {
        "wildcard"
    }

    fn comparators(&self) -> &'static [&'static str] {
        &[super::WILDCARD_COMPARATOR]
    }

    fn multi_field_query(
        &self,
        value: &TermValue,
        members: &[GroupMember],
    ) -> Result<Query, CompileError> {
        Ok(Query::Bool(BoolQuery::with(
            Occur::Should,
            members.iter().map(|member| Query::Wildcard {
                field: member.term_level_field(),
                pattern: value.to_string(),
            }),
        )))
    }

    fn fulltext_query(
        &self,
        value: &TermValue,
        target: &FulltextTarget<'_>,
        _modifiers: &[Modifier],
    ) -> Result<Query, CompileError> {
        Ok(Query::Wildcard {
            field: target.literal_field(),
            pattern: value.to_string(),
        })
    }

    fn term_level_query(&self, value: &TermValue, field: &str) -> Result<Query, CompileError> {
        Ok(Query::Wildcard {
            field: field.to_string(),
            pattern: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Full-text target for a multilingual title field.
    fn title() -> FulltextTarget<'static> {
        FulltextTarget {
            path: "title",
            multilang: true,
        }
    }

    #[test]
    fn equal_uses_literal_field_with_string_modifier() {
        let value = TermValue::from("semantic web");
        let analyzed = EqualBuilder.fulltext_query(&value, &title(), &[]).unwrap();
        assert_eq!(
            analyzed,
            Query::fulltext(vec!["title.*".into()], "semantic web", MatchMode::All)
        );

        let literal = EqualBuilder
            .fulltext_query(&value, &title(), &[Modifier::new("STRING")])
            .unwrap();
        assert_eq!(literal, Query::term("plain_title", "semantic web"));
    }

    /// Members of a keyword-style group: two full-text fields and an identifier.
    fn keyword_members() -> Vec<GroupMember> {
        vec![
            GroupMember {
                path: "title".into(),
                fulltext: true,
                multilang: true,
            },
            GroupMember {
                path: "contributors.name".into(),
                fulltext: true,
                multilang: false,
            },
            GroupMember::untokenized("identifiers.isbn"),
        ]
    }

    #[test]
    fn exact_multi_field_targets_literal_fields() {
        let query = ExactBuilder
            .multi_field_query(&TermValue::from("x"), &keyword_members())
            .unwrap();
        assert_eq!(
            query,
            Query::Bool(BoolQuery::with(
                Occur::Should,
                [
                    Query::term("plain_title", "x"),
                    Query::term("contributors.plain_name", "x"),
                    Query::term("identifiers.isbn", "x")
                ]
            ))
        );
    }

    #[test]
    fn wildcard_multi_field_targets_literal_fields() {
        let query = WildcardBuilder
            .multi_field_query(&TermValue::from("sem*"), &keyword_members())
            .unwrap();
        let fields: Vec<&str> = query
            .as_bool()
            .unwrap()
            .should
            .iter()
            .filter_map(|q| match q {
                Query::Wildcard { field, .. } => Some(field.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec!["plain_title", "contributors.plain_name", "identifiers.isbn"]
        );
    }

    #[test]
    fn analyzed_multi_field_searches_language_variants() {
        let query = AllBuilder
            .multi_field_query(&TermValue::from("dune"), &keyword_members())
            .unwrap();
        assert_eq!(
            query,
            Query::fulltext(
                vec![
                    "title.*".into(),
                    "contributors.name".into(),
                    "identifiers.isbn".into()
                ],
                "dune",
                MatchMode::All
            )
        );
    }

    #[test]
    fn all_and_any_split_term_level_words() {
        let value = TermValue::from("eng fre");
        let all = AllBuilder
            .term_level_query(&value, "languages")
            .unwrap();
        assert_eq!(all.as_bool().unwrap().must.len(), 2);

        let any = AnyBuilder
            .term_level_query(&value, "languages")
            .unwrap();
        assert_eq!(any.disjunction_field(), Some("languages"));

        let single = AnyBuilder
            .term_level_query(&TermValue::from("eng"), "languages")
            .unwrap();
        assert_eq!(single, Query::term("languages", "eng"));
    }

    #[test]
    fn adj_is_a_phrase() {
        let query = AdjBuilder
            .multi_field_query(&TermValue::from("a b"), &keyword_members())
            .unwrap();
        assert!(matches!(
            query,
            Query::Fulltext {
                mode: MatchMode::Phrase,
                ..
            }
        ));
    }

    #[test]
    fn not_equal_excludes() {
        let query = NotEqualBuilder
            .term_level_query(&TermValue::from("eng"), "languages")
            .unwrap();
        let bool_query = query.as_bool().unwrap();
        assert!(bool_query.must.is_empty());
        assert_eq!(bool_query.must_not, vec![Query::term("languages", "eng")]);
    }

    #[test]
    fn range_bounds_and_inclusivity() {
        let value = TermValue::Long(5);
        let gt = RangeBuilder::new(RangeBound::GreaterThan)
            .term_level_query(&value, "n")
            .unwrap();
        assert_eq!(gt, Query::Range(RangeQuery::lower_bounded("n", 5_i64, false)));

        let le = RangeBuilder::new(RangeBound::AtMost)
            .term_level_query(&value, "n")
            .unwrap();
        assert_eq!(le, Query::Range(RangeQuery::upper_bounded("n", 5_i64, true)));
    }

    #[test]
    fn range_rejects_multi_field_groups() {
        let err = RangeBuilder::new(RangeBound::LessThan)
            .multi_field_query(&TermValue::from("x"), &[GroupMember::untokenized("a")])
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedFeature(ref m) if m.contains("less-than")));
    }

    #[test]
    fn wildcard_targets_literal_fields() {
        let query = WildcardBuilder
            .fulltext_query(&TermValue::from("sem*"), &title(), &[])
            .unwrap();
        assert_eq!(
            query,
            Query::Wildcard {
                field: "plain_title".into(),
                pattern: "sem*".into()
            }
        );
    }
}
