//! Rendering and JSON serialization for CLI output.

use std::{fmt::Display, process::ExitCode};

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use shelf_config::{FieldDescriptor, ResourceCatalog, SortType};

/// Prints a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Reports a request error on stderr.
pub fn report_error(error: &impl Display) -> ExitCode {
    eprintln!("error: {error}");
    ExitCode::FAILURE
}

/// Renders the fields of one resource as a table.
pub fn fields_table(resource: &ResourceCatalog) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        "Field",
        "Capabilities",
        "Type",
        "Normalizer",
        "Sort",
    ]);
    for field in resource.fields.values() {
        table.add_row(vec![
            Cell::new(field_label(field)),
            Cell::new(capabilities(field)),
            Cell::new(field.value_type.to_string()),
            Cell::new(field.normalizer.as_deref().unwrap_or("-")),
            Cell::new(sort_label(field)),
        ]);
    }
    table
}

/// Field path, marked with `.*` when indexed per language.
fn field_label(field: &FieldDescriptor) -> String {
    if field.multilang {
        format!("{}.*", field.path)
    } else {
        field.path.clone()
    }
}

/// Comma-separated capability tags.
fn capabilities(field: &FieldDescriptor) -> String {
    field
        .capabilities
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sort field and layout, if the field declares one.
fn sort_label(field: &FieldDescriptor) -> String {
    let Some(sort) = &field.sort else {
        return "-".to_string();
    };
    let target = sort.field.as_deref().unwrap_or("(default)");
    match sort.kind {
        SortType::Single => target.to_string(),
        SortType::Collection if sort.secondary.is_empty() => format!("{target} (collection)"),
        SortType::Collection => format!(
            "{target} (collection, then {})",
            sort.secondary.join(", ")
        ),
    }
}
