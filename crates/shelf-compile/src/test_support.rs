//! Test helpers shared across shelf-compile unit tests.

use shelf_config::{Config, FieldCatalog};

use crate::{ComparatorDispatch, NormalizationRegistry, QueryCompiler, TermCompiler};

/// Catalog used by the unit tests.
const TEST_CONFIG: &str = r#"
[browse]
default_limit = 20
call_number_range_offset = 1000

[resource.instance.aliases]
"cql.serverChoice" = "keyword"
contributor = "contributors.name"
updatedDate = "metadata.updatedDate"

[resource.instance.groups]
keyword = ["title", "contributors.name", "identifiers.isbn"]
isbn = "identifiers.isbn"
lang = "languages"

[resource.instance.fields.title]
capabilities = ["fulltext", "sort"]
multilang = true
sort = { field = "sort_title", type = "single" }

[resource.instance.fields."contributors.name"]
capabilities = ["fulltext", "sort"]
sort = { field = "sort_contributors", type = "collection", secondary = ["sort_title"] }

[resource.instance.fields."identifiers.isbn"]
capabilities = "filter"
normalizer = "isbn"

[resource.instance.fields.languages]
capabilities = ["filter", "facet"]

[resource.instance.fields.genre]
capabilities = ["filter", "facet"]

[resource.instance.fields."metadata.updatedDate"]
capabilities = ["filter", "sort"]
value_type = "date"

[resource.instance.fields.holdingsCount]
capabilities = "filter"
value_type = "long"

[resource.instance.fields.staffSuppress]
capabilities = "filter"
value_type = "boolean"

[resource.instance.fields.callNumber]
capabilities = "sort"
normalizer = "call-number"
value_type = "long"

[resource.instance.fields.shelfKey]
capabilities = "sort"
normalizer = "shelf-key"

[resource.instance.fields.publicationDate]
capabilities = "sort"

[resource.instance.fields.sort_subject]
capabilities = "sort"

[resource.authority.fields.headingRef]
capabilities = ["fulltext", "sort"]

[resource.authority.fields.headingType]
capabilities = ["filter", "facet"]
"#;

/// Start-time tables built from the test catalog.
pub struct Tables {
    /// Field metadata.
    pub catalog: FieldCatalog,
    /// Standard normalizers.
    pub normalizers: NormalizationRegistry,
    /// Standard comparator strategies.
    pub dispatch: ComparatorDispatch,
}

impl Tables {
    /// A term compiler over these tables.
    pub fn terms(&self) -> TermCompiler<'_> {
        TermCompiler::new(&self.catalog, &self.normalizers, &self.dispatch)
    }
}

/// Parses the test catalog.
pub fn config() -> Config {
    Config::from_toml_str(TEST_CONFIG).unwrap()
}

/// Builds the test tables.
pub fn tables() -> Tables {
    Tables {
        catalog: config().catalog(),
        normalizers: NormalizationRegistry::standard().unwrap(),
        dispatch: ComparatorDispatch::standard().unwrap(),
    }
}

/// Builds a compiler over the test catalog.
pub fn compiler() -> QueryCompiler {
    QueryCompiler::from_config(&config()).unwrap()
}
