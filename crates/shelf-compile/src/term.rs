//! Leaf compilation.
//!
//! Compiles one CQL search clause into one query: resolves the field through aliases and
//! groups, normalizes the value, picks the comparator strategy and validates literals
//! against the field's value type.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::trace;
use shelf_config::{FieldCatalog, FieldDescriptor, ValueType};
use shelf_cql::TermNode;

use crate::{
    CompileError, ComparatorDispatch, NormalizationRegistry, Query, TermValue,
    dispatch::{FulltextTarget, GroupMember, TermQueryBuilder, WILDCARD_COMPARATOR, literal_field},
};

/// Field name matching every record when compared with `= 1`.
const ALL_RECORDS_INDEX: &str = "cql.allRecords";

/// Field name matching every record when compared with `= *`.
const KEYWORD_INDEX: &str = "keyword";

/// Relation modifier forcing literal (untokenized) matching.
const STRING_MODIFIER: &str = "string";

/// Date formats accepted for date-typed fields, tried in order.
const LOCAL_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A resolved search target.
enum Target<'c> {
    /// One described field.
    Field(&'c FieldDescriptor),
    /// Several fields searched together.
    Group(&'c [String]),
}

/// Compiles search clauses against a catalog.
pub struct TermCompiler<'a> {
    /// Field metadata.
    catalog: &'a FieldCatalog,
    /// Value normalizers.
    normalizers: &'a NormalizationRegistry,
    /// Comparator strategies.
    dispatch: &'a ComparatorDispatch,
}

impl<'a> TermCompiler<'a> {
    /// Creates a term compiler over shared tables.
    pub fn new(
        catalog: &'a FieldCatalog,
        normalizers: &'a NormalizationRegistry,
        dispatch: &'a ComparatorDispatch,
    ) -> Self {
        Self {
            catalog,
            normalizers,
            dispatch,
        }
    }

    /// Compiles one search clause.
    pub fn compile(&self, node: &TermNode, resource: &str) -> Result<Query, CompileError> {
        if is_match_all(node) {
            return Ok(Query::MatchAll);
        }

        let path = self.catalog.resolve_alias(resource, &node.index);
        let target = self.resolve_target(resource, path)?;
        let value = self.normalize(resource, &target, &node.term)?;
        let builder = self.strategy(&value, &node.comparator)?;

        match target {
            Target::Group(members) => {
                let members = self.prepare_members(
                    resource,
                    members,
                    node.has_modifier(STRING_MODIFIER),
                );
                builder.multi_field_query(&value, &members)
            }
            Target::Field(field) if field.is_fulltext() => {
                let target = FulltextTarget {
                    path: &field.path,
                    multilang: field.multilang,
                };
                builder.fulltext_query(&value, &target, &node.modifiers)
            }
            Target::Field(field)
                if is_pattern(&value) && field.value_type != ValueType::Keyword =>
            {
                Err(CompileError::UnsupportedFeature(format!(
                    "wildcard on {} field '{}'",
                    field.value_type, field.path
                )))
            }
            Target::Field(field) => {
                let value = validate_value(field, value)?;
                builder.term_level_query(&value, &field.path)
            }
        }
    }

    /// Resolves a path to a single field or a multi-field group.
    fn resolve_target(&self, resource: &str, path: &str) -> Result<Target<'a>, CompileError> {
        let catalog = self.catalog;
        let members = catalog.resolve_group(resource, path);
        let target = match members {
            [only] => catalog.describe(resource, only).map(Target::Field),
            [] => catalog.describe(resource, path).map(Target::Field),
            _ => Some(Target::Group(members)),
        };
        target.ok_or_else(|| CompileError::InvalidField {
            field: path.to_string(),
            resource: resource.to_string(),
        })
    }

    /// Runs the target's normalizer, if it names one.
    fn normalize(
        &self,
        resource: &str,
        target: &Target<'_>,
        raw: &str,
    ) -> Result<TermValue, CompileError> {
        let normalizer = match target {
            Target::Field(field) => field.normalizer.as_deref(),
            Target::Group(members) => members
                .first()
                .and_then(|first| self.catalog.describe(resource, first))
                .and_then(|field| field.normalizer.as_deref()),
        };
        let Some(name) = normalizer else {
            return Ok(TermValue::Text(raw.to_string()));
        };
        self.normalizers
            .normalize(name, raw)
            .ok_or_else(|| CompileError::UnsupportedFeature(format!("normalizer '{name}'")))
    }

    /// Picks the strategy: wildcard for values containing `*`, else the comparator's owner.
    fn strategy(
        &self,
        value: &TermValue,
        comparator: &str,
    ) -> Result<&'a dyn TermQueryBuilder, CompileError> {
        let key = if is_pattern(value) {
            WILDCARD_COMPARATOR.to_string()
        } else {
            comparator.to_lowercase()
        };
        self.dispatch
            .lookup(&key)
            .ok_or_else(|| CompileError::UnsupportedFeature(format!("comparator '{comparator}'")))
    }

    /// Describes group members for the strategy; the `string` modifier turns full-text
    /// members into their literal fields.
    fn prepare_members(
        &self,
        resource: &str,
        members: &[String],
        literal: bool,
    ) -> Vec<GroupMember> {
        members
            .iter()
            .map(|member| match self.catalog.describe(resource, member) {
                Some(field) if literal && field.is_fulltext() => {
                    GroupMember::untokenized(literal_field(&field.path))
                }
                Some(field) => GroupMember::from_field(field),
                None => GroupMember::untokenized(member.as_str()),
            })
            .collect()
    }
}

/// True for a textual value containing a `*` wildcard.
fn is_pattern(value: &TermValue) -> bool {
    value.as_text().is_some_and(|text| text.contains('*'))
}

/// True for `cql.allRecords = 1` and `keyword = *`.
fn is_match_all(node: &TermNode) -> bool {
    if node.comparator != "=" {
        return false;
    }
    (node.index.eq_ignore_ascii_case(ALL_RECORDS_INDEX) && node.term == "1")
        || (node.index.eq_ignore_ascii_case(KEYWORD_INDEX) && node.term == "*")
}

/// Checks a literal against the field's value type, converting where needed.
fn validate_value(field: &FieldDescriptor, value: TermValue) -> Result<TermValue, CompileError> {
    let TermValue::Text(text) = value else {
        return Ok(value);
    };
    let checked = match field.value_type {
        ValueType::Keyword => return Ok(TermValue::Text(text)),
        ValueType::Date if is_valid_date(&text) => Ok(TermValue::Text(text.clone())),
        ValueType::Date => Err("expected an ISO-8601 date or date-time"),
        ValueType::Long => text
            .trim()
            .parse::<i64>()
            .map(TermValue::Long)
            .map_err(|_| "expected an integer"),
        ValueType::Boolean => match text.to_ascii_lowercase().as_str() {
            literal @ ("true" | "false") => Ok(TermValue::from(literal)),
            _ => Err("expected true or false"),
        },
    };
    checked.map_err(|reason| CompileError::ValueValidation {
        field: field.path.clone(),
        value: text,
        reason: reason.to_string(),
    })
}

/// Tries ISO date, offset date-time, then local date-time with and without seconds.
fn is_valid_date(text: &str) -> bool {
    if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() {
        trace!("'{text}' parsed as ISO date");
        return true;
    }
    if DateTime::parse_from_rfc3339(text).is_ok() {
        trace!("'{text}' parsed as ISO offset date-time");
        return true;
    }
    LOCAL_DATE_TIME_FORMATS.iter().any(|format| {
        let matched = NaiveDateTime::parse_from_str(text, format).is_ok();
        if matched {
            trace!("'{text}' parsed as local date-time ({format})");
        }
        matched
    })
}

#[cfg(test)]
mod tests {
    use shelf_cql::Modifier;

    use super::*;
    use crate::{BoolQuery, MatchMode, Occur, RangeQuery, normalize::encode_call_number, test_support};

    /// Compiles one clause against the test catalog's instance resource.
    fn compile(node: TermNode) -> Result<Query, CompileError> {
        let tables = test_support::tables();
        tables.terms().compile(&node, "instance")
    }

    #[test]
    fn match_all_sentinels() {
        for node in [
            TermNode::new("cql.allRecords", "=", "1"),
            TermNode::new("CQL.ALLRECORDS", "=", "1"),
            TermNode::new("keyword", "=", "*"),
        ] {
            assert_eq!(compile(node).unwrap(), Query::MatchAll);
        }
        assert_ne!(
            compile(TermNode::new("keyword", "all", "*")).unwrap(),
            Query::MatchAll
        );
    }

    #[test]
    fn alias_and_group_fan_out() {
        let query = compile(TermNode::new("cql.serverChoice", "all", "semantic web")).unwrap();
        assert_eq!(
            query,
            Query::fulltext(
                vec![
                    "title.*".into(),
                    "contributors.name".into(),
                    "identifiers.isbn".into()
                ],
                "semantic web",
                MatchMode::All
            )
        );
    }

    #[test]
    fn string_modifier_rewrites_fulltext_group_members() {
        let node = TermNode::new("keyword", "==", "Dune").with_modifier(Modifier::new("string"));
        let query = compile(node).unwrap();
        let fields: Vec<&str> = query
            .as_bool()
            .unwrap()
            .should
            .iter()
            .filter_map(|q| q.as_term().map(|(field, _)| field))
            .collect();
        assert_eq!(
            fields,
            vec!["plain_title", "contributors.plain_name", "identifiers.isbn"]
        );
    }

    #[test]
    fn exact_group_match_uses_literal_fields() {
        let query = compile(TermNode::new("keyword", "==", "Dune")).unwrap();
        assert_eq!(
            query,
            Query::Bool(BoolQuery::with(
                Occur::Should,
                [
                    Query::term("plain_title", "Dune"),
                    Query::term("contributors.plain_name", "Dune"),
                    Query::term("identifiers.isbn", "Dune")
                ]
            ))
        );
        assert_eq!(
            compile(TermNode::new("contributor", "==", "Dune")).unwrap(),
            Query::term("contributors.plain_name", "Dune")
        );
    }

    #[test]
    fn wildcard_group_match_uses_literal_fields() {
        let query = compile(TermNode::new("keyword", "=", "sem*")).unwrap();
        assert_eq!(
            query,
            Query::Bool(BoolQuery::with(
                Occur::Should,
                ["plain_title", "contributors.plain_name", "identifiers.isbn"].map(|field| {
                    Query::Wildcard {
                        field: field.into(),
                        pattern: "sem*".into(),
                    }
                })
            ))
        );
        assert_eq!(
            compile(TermNode::new("contributor", "=", "sem*")).unwrap(),
            Query::Wildcard {
                field: "contributors.plain_name".into(),
                pattern: "sem*".into()
            }
        );
    }

    #[test]
    fn wildcard_on_typed_field_is_unsupported() {
        let err = compile(TermNode::new("updatedDate", "=", "2024-01*")).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedFeature(
                "wildcard on date field 'metadata.updatedDate'".into()
            )
        );
    }

    #[test]
    fn single_member_group_uses_member_descriptor() {
        let query = compile(TermNode::new("isbn", "=", "0-306-40615-2")).unwrap();
        assert_eq!(query, Query::term("identifiers.isbn", "9780306406157"));
    }

    #[test]
    fn unknown_field_is_invalid() {
        let err = compile(TermNode::new("nosuchfield", "=", "x")).unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidField {
                field: "nosuchfield".into(),
                resource: "instance".into()
            }
        );
    }

    #[test]
    fn unknown_comparator_is_unsupported() {
        let err = compile(TermNode::new("title", "within", "x")).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedFeature(ref m) if m.contains("within")));
    }

    #[test]
    fn comparator_is_case_insensitive() {
        let query = compile(TermNode::new("title", "ALL", "dune")).unwrap();
        assert_eq!(
            query,
            Query::fulltext(vec!["title.*".into()], "dune", MatchMode::All)
        );
    }

    #[test]
    fn wildcard_value_forces_wildcard_strategy() {
        let query = compile(TermNode::new("languages", "==", "en*")).unwrap();
        assert_eq!(
            query,
            Query::Wildcard {
                field: "languages".into(),
                pattern: "en*".into()
            }
        );
    }

    #[test]
    fn call_number_normalizer_enables_numeric_ranges() {
        let query = compile(TermNode::new("callNumber", ">=", "PR 9199.3")).unwrap();
        assert_eq!(
            query,
            Query::Range(RangeQuery::lower_bounded(
                "callNumber",
                encode_call_number("PR 9199.3"),
                true
            ))
        );
    }

    #[test]
    fn call_number_wildcard_is_dropped_by_normalizer() {
        let query = compile(TermNode::new("callNumber", "==", "PR*")).unwrap();
        assert_eq!(
            query,
            Query::term("callNumber", encode_call_number("PR"))
        );
    }

    #[test]
    fn date_fields_accept_iso_formats() {
        for value in [
            "2024-01-31",
            "2024-01-31T10:15:30Z",
            "2024-01-31T10:15:30+02:00",
            "2024-01-31T10:15:30",
            "2024-01-31T10:15:30.123",
            "2024-01-31T10:15",
        ] {
            let query = compile(TermNode::new("updatedDate", ">", value)).unwrap();
            assert!(query.as_range().is_some(), "{value}");
        }
    }

    #[test]
    fn date_fields_reject_malformed_values() {
        let err = compile(TermNode::new("updatedDate", ">", "31/01/2024")).unwrap_err();
        assert_eq!(
            err,
            CompileError::ValueValidation {
                field: "metadata.updatedDate".into(),
                value: "31/01/2024".into(),
                reason: "expected an ISO-8601 date or date-time".into()
            }
        );
    }

    #[test]
    fn long_and_boolean_fields_are_typed() {
        let query = compile(TermNode::new("holdingsCount", "<", "5")).unwrap();
        assert_eq!(
            query,
            Query::Range(RangeQuery::upper_bounded("holdingsCount", 5_i64, false))
        );
        assert!(matches!(
            compile(TermNode::new("holdingsCount", "=", "five")),
            Err(CompileError::ValueValidation { .. })
        ));

        let query = compile(TermNode::new("staffSuppress", "==", "TRUE")).unwrap();
        assert_eq!(query, Query::term("staffSuppress", "true"));
        assert!(matches!(
            compile(TermNode::new("staffSuppress", "==", "yes")),
            Err(CompileError::ValueValidation { .. })
        ));
    }

    #[test]
    fn any_on_keyword_field_is_disjunction() {
        let query = compile(TermNode::new("languages", "any", "eng fre")).unwrap();
        assert_eq!(
            query,
            Query::Bool(BoolQuery::with(
                Occur::Should,
                [Query::term("languages", "eng"), Query::term("languages", "fre")]
            ))
        );
    }
}
