//! Implementation of `shelf facets`.

use std::process::ExitCode;

use crate::cli::{
    args::FacetsCommand,
    context::CommandContext,
    output::{print_json, report_error},
};

/// Compiles an expression tree and prints the facet aggregations for it.
pub fn run(ctx: &CommandContext, cmd: &FacetsCommand) -> ExitCode {
    let (tree, compiler) = match ctx.prepare(&cmd.query.input) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };
    let resource = &cmd.query.resource;

    let aggregations = compiler
        .compile_query(&tree, resource)
        .and_then(|search| compiler.build_facets(&search.query, &cmd.facets, resource));
    match aggregations {
        Ok(aggregations) => print_json(&aggregations),
        Err(e) => report_error(&e),
    }
}
