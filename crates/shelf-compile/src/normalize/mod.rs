//! Named term normalizers.
//!
//! Fields name a normalizer in the catalog; the term compiler runs the search value
//! through it before choosing a comparator strategy. Normalizers may return text or a
//! number, and a numeric result is what lets range comparators work on call numbers.

mod call_number;
mod identifiers;
mod shelf_key;

use std::{collections::HashMap, fmt};

pub use call_number::encode_call_number;
pub use shelf_key::shelf_key;

use crate::{RegistryError, TermValue};

/// A normalizer function.
pub type Normalizer = Box<dyn Fn(&str) -> TermValue + Send + Sync>;

/// Normalizers keyed by name.
///
/// Populated once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct NormalizationRegistry {
    /// Registered normalizers.
    normalizers: HashMap<String, Normalizer>,
}

impl NormalizationRegistry {
    /// Creates a registry with the built-in normalizers.
    pub fn standard() -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        registry.register("call-number", |v| TermValue::Long(encode_call_number(v)))?;
        registry.register("shelf-key", |v| TermValue::Text(shelf_key(v)))?;
        registry.register("lccn", |v| TermValue::Text(identifiers::lccn(v)))?;
        registry.register("oclc", |v| TermValue::Text(identifiers::oclc(v)))?;
        registry.register("isbn", |v| TermValue::Text(identifiers::isbn(v)))?;
        registry.register("lowercase", |v| TermValue::Text(v.to_lowercase()))?;
        Ok(registry)
    }

    /// Registers a normalizer under a unique name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        normalizer: impl Fn(&str) -> TermValue + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.normalizers.contains_key(&name) {
            return Err(RegistryError::DuplicateNormalizer { name });
        }
        self.normalizers.insert(name, Box::new(normalizer));
        Ok(())
    }

    /// Returns true if a normalizer with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.normalizers.contains_key(name)
    }

    /// Runs a named normalizer, or returns `None` if it is not registered.
    pub fn normalize(&self, name: &str, value: &str) -> Option<TermValue> {
        self.normalizers.get(name).map(|normalizer| normalizer(value))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.normalizers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for NormalizationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizationRegistry")
            .field("normalizers", &self.names())
            .finish()
    }
}
