//! Comparator dispatch.
//!
//! Each comparator token (`=`, `==`, `all`, `<=`, ...) is owned by exactly one
//! [`TermQueryBuilder`] strategy. The dispatch table is built once at startup; two
//! strategies claiming the same comparator is a configuration error.

mod builders;

use std::{collections::HashMap, fmt};

pub use builders::{
    AdjBuilder, AllBuilder, AnyBuilder, EqualBuilder, ExactBuilder, NotEqualBuilder,
    RangeBound, RangeBuilder, WildcardBuilder,
};
use shelf_config::FieldDescriptor;
use shelf_cql::Modifier;

use crate::{CompileError, Query, RegistryError, TermValue};

/// Comparator owned by the wildcard strategy; values containing `*` are routed to it.
pub const WILDCARD_COMPARATOR: &str = "wildcard";

/// Prefix of the untokenized variant of a full-text field.
pub const LITERAL_FIELD_PREFIX: &str = "plain_";

/// Returns the literal-match variant of a field path.
///
/// The prefix goes on the last path segment: `contributors.name` becomes
/// `contributors.plain_name`. A trailing `.*` language wildcard is dropped first.
pub fn literal_field(path: &str) -> String {
    let path = path.strip_suffix(".*").unwrap_or(path);
    match path.rsplit_once('.') {
        Some((parent, leaf)) => format!("{parent}.{LITERAL_FIELD_PREFIX}{leaf}"),
        None => format!("{LITERAL_FIELD_PREFIX}{path}"),
    }
}

/// A single full-text field as seen by a strategy.
#[derive(Debug, Clone, Copy)]
pub struct FulltextTarget<'a> {
    /// Field path.
    pub path: &'a str,
    /// Whether the field is indexed per language.
    pub multilang: bool,
}

impl FulltextTarget<'_> {
    /// Fields to run an analyzed query against.
    pub fn search_fields(&self) -> Vec<String> {
        if self.multilang {
            vec![format!("{}.*", self.path)]
        } else {
            vec![self.path.to_string()]
        }
    }

    /// The untokenized variant of the field.
    pub fn literal_field(&self) -> String {
        literal_field(self.path)
    }
}

/// A member of a multi-field group, prepared for a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    /// Field path.
    pub path: String,
    /// Whether the path is an analyzed full-text field.
    pub fulltext: bool,
    /// Whether the field is indexed per language.
    pub multilang: bool,
}

impl GroupMember {
    /// A member matched as-is, without analysis.
    pub fn untokenized(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fulltext: false,
            multilang: false,
        }
    }

    /// A member described by the catalog.
    pub fn from_field(field: &FieldDescriptor) -> Self {
        Self {
            path: field.path.clone(),
            fulltext: field.is_fulltext(),
            multilang: field.multilang,
        }
    }

    /// Field an analyzed query searches; `path.*` covers every language variant.
    pub fn search_field(&self) -> String {
        if self.multilang {
            format!("{}.*", self.path)
        } else {
            self.path.clone()
        }
    }

    /// Field a whole-value or pattern match runs against: the literal variant of
    /// full-text members, the path itself otherwise.
    pub fn term_level_field(&self) -> String {
        if self.fulltext {
            literal_field(&self.path)
        } else {
            self.path.clone()
        }
    }
}

/// Analyzed search fields of every member, in group order.
pub fn search_fields(members: &[GroupMember]) -> Vec<String> {
    members.iter().map(GroupMember::search_field).collect()
}

/// A comparator strategy.
///
/// Builders that cannot handle a target shape leave the default method in place, which
/// reports the combination as unsupported.
pub trait TermQueryBuilder: Send + Sync {
    /// Strategy name, used in error messages.
    fn name(&self) -> &'static str;

    /// Comparator tokens owned by this strategy (lowercase).
    fn comparators(&self) -> &'static [&'static str];

    /// Builds a query over the prepared members of a multi-field group.
    fn multi_field_query(
        &self,
        _value: &TermValue,
        _members: &[GroupMember],
    ) -> Result<Query, CompileError> {
        Err(unsupported(self.name(), "multi-field groups"))
    }

    /// Builds a query against one full-text field.
    fn fulltext_query(
        &self,
        _value: &TermValue,
        _target: &FulltextTarget<'_>,
        _modifiers: &[Modifier],
    ) -> Result<Query, CompileError> {
        Err(unsupported(self.name(), "full-text fields"))
    }

    /// Builds a query against one untokenized field.
    fn term_level_query(&self, _value: &TermValue, _field: &str) -> Result<Query, CompileError> {
        Err(unsupported(self.name(), "term-level fields"))
    }
}

/// Error for a strategy that does not handle a target shape.
fn unsupported(strategy: &str, target: &str) -> CompileError {
    CompileError::UnsupportedFeature(format!(
        "comparator strategy '{strategy}' does not support {target}"
    ))
}

/// Maps comparator tokens to their strategy.
pub struct ComparatorDispatch {
    /// Registered strategies in registration order.
    builders: Vec<Box<dyn TermQueryBuilder>>,
    /// Comparator token to index into `builders`.
    by_comparator: HashMap<&'static str, usize>,
}

impl ComparatorDispatch {
    /// Builds the table, rejecting comparators claimed by more than one strategy.
    pub fn new(builders: Vec<Box<dyn TermQueryBuilder>>) -> Result<Self, RegistryError> {
        let mut by_comparator: HashMap<&'static str, usize> = HashMap::new();
        for (index, builder) in builders.iter().enumerate() {
            for &comparator in builder.comparators() {
                if let Some(&existing) = by_comparator.get(comparator) {
                    return Err(RegistryError::DuplicateComparator {
                        comparator: comparator.to_string(),
                        first: builders[existing].name().to_string(),
                        second: builder.name().to_string(),
                    });
                }
                by_comparator.insert(comparator, index);
            }
        }
        Ok(Self {
            builders,
            by_comparator,
        })
    }

    /// Builds the table of built-in strategies.
    pub fn standard() -> Result<Self, RegistryError> {
        Self::new(vec![
            Box::new(EqualBuilder),
            Box::new(ExactBuilder),
            Box::new(AllBuilder),
            Box::new(AnyBuilder),
            Box::new(AdjBuilder),
            Box::new(NotEqualBuilder),
            Box::new(RangeBuilder::new(RangeBound::GreaterThan)),
            Box::new(RangeBuilder::new(RangeBound::AtLeast)),
            Box::new(RangeBuilder::new(RangeBound::LessThan)),
            Box::new(RangeBuilder::new(RangeBound::AtMost)),
            Box::new(WildcardBuilder),
        ])
    }

    /// Looks up the strategy owning a comparator token (already lowercased).
    pub fn lookup(&self, comparator: &str) -> Option<&dyn TermQueryBuilder> {
        self.by_comparator
            .get(comparator)
            .map(|&index| self.builders[index].as_ref())
    }

    /// Registered comparator tokens in sorted order.
    pub fn comparators(&self) -> Vec<&'static str> {
        let mut comparators: Vec<&'static str> = self.by_comparator.keys().copied().collect();
        comparators.sort_unstable();
        comparators
    }
}

impl fmt::Debug for ComparatorDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparatorDispatch")
            .field("comparators", &self.comparators())
            .finish()
    }
}
