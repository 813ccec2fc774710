//! Implementation of `shelf fields`.

use std::process::ExitCode;

use shelf_config::ResourceCatalog;

use crate::cli::{args::FieldsCommand, context::CommandContext, output::fields_table};

/// Lists catalog fields, aliases and groups.
pub fn run(ctx: &CommandContext, cmd: &FieldsCommand) -> ExitCode {
    if let Some(resource) = &cmd.resource {
        if let Err(code) = ctx.require_resource(resource) {
            return code;
        }
        print_resource(&ctx.config.resources[resource]);
        return ExitCode::SUCCESS;
    }

    if ctx.config.resources.is_empty() {
        println!("No resources defined.");
        println!();
        println!("Run 'shelf init' to create a configuration file.");
        return ExitCode::SUCCESS;
    }
    for resource in ctx.config.resources.values() {
        print_resource(resource);
    }
    ExitCode::SUCCESS
}

/// Prints one resource's fields, aliases and groups.
fn print_resource(resource: &ResourceCatalog) {
    println!("Resource: {}", resource.name);
    println!("{}", fields_table(resource));

    if !resource.aliases.is_empty() {
        println!("Aliases:");
        for (alias, target) in &resource.aliases {
            println!("  {alias} -> {target}");
        }
    }
    if !resource.groups.is_empty() {
        println!("Groups:");
        for (group, members) in &resource.groups {
            println!("  {group} = [{}]", members.join(", "));
        }
    }
    println!();
}
