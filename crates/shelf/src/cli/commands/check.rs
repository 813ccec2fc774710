//! Implementation of `shelf check`.

use std::process::ExitCode;

use shelf_config::ConfigWarning;

use crate::cli::context::CommandContext;

/// Exit codes for `shelf check`.
mod exit_codes {
    use std::process::ExitCode;

    /// Configuration is valid with no warnings.
    pub const OK: ExitCode = ExitCode::SUCCESS;
    /// Configuration has warnings or cannot be used by the compiler.
    pub const WARNINGS: ExitCode = ExitCode::FAILURE;
}

/// Validates configuration and reports warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    println!("Checking configuration...");
    println!();

    if ctx.config_files.is_empty() {
        println!("No configuration files found.");
        println!();
        println!("Run 'shelf init' to create a configuration file.");
        return exit_codes::OK;
    }

    println!("Config files:");
    for path in &ctx.config_files {
        println!("  {}", path.display());
    }
    println!();

    println!("Resources:");
    if ctx.config.resources.is_empty() {
        println!("  (none defined)");
    } else {
        for resource in ctx.config.resources.values() {
            println!(
                "  {} ({} fields, {} aliases, {} groups)",
                resource.name,
                resource.fields.len(),
                resource.aliases.len(),
                resource.groups.len()
            );
        }
    }
    println!();

    if let Err(code) = ctx.compiler() {
        return code;
    }

    let warnings = ctx.config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return exit_codes::OK;
    }

    println!("Warnings ({}):", warnings.len());
    for warning in &warnings {
        println!("  - {warning}");
    }
    println!();
    print_hints(&warnings);

    exit_codes::WARNINGS
}

/// Prints hints for resolving the reported warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings
        .iter()
        .map(|warning| match warning {
            ConfigWarning::NoResourcesDefined => {
                "Add a [resource.<name>.fields] table to describe searchable fields."
            }
            ConfigWarning::UndefinedGroupMember { .. } => {
                "Describe the group member under [resource.<name>.fields] or remove it."
            }
            ConfigWarning::UndefinedAliasTarget { .. } => {
                "Point the alias at a described field or group."
            }
            ConfigWarning::SortWithoutCapability { .. } => {
                "Add \"sort\" to the field's capabilities or drop its sort settings."
            }
        })
        .collect();

    hints.sort_unstable();
    hints.dedup();

    println!("Hints:");
    for hint in hints {
        println!("  - {hint}");
    }
}
