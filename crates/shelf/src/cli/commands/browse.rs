//! Implementation of `shelf browse`.

use std::process::ExitCode;

use log::info;
use shelf_compile::BrowseRequest;

use crate::cli::{
    args::BrowseCommand,
    context::CommandContext,
    output::{print_json, report_error},
};

/// Compiles an expression tree and prints the browse context recovered from it.
pub fn run(ctx: &CommandContext, cmd: &BrowseCommand) -> ExitCode {
    let (tree, compiler) = match ctx.prepare(&cmd.query.input) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };

    let limit = cmd
        .limit
        .unwrap_or(compiler.browse_settings().default_limit);
    let mut request = BrowseRequest::new(tree.to_cql_string(), &cmd.field, limit);
    if let Some(preceding) = cmd.preceding {
        request = request.with_preceding(preceding);
    }
    info!("browsing '{}' with limit {limit}", cmd.field);

    let context = compiler
        .compile_query(&tree, &cmd.query.resource)
        .and_then(|search| {
            if cmd.call_number {
                compiler.build_call_number_browse_context(&search, &request)
            } else {
                compiler.build_browse_context(&search, &request)
            }
        });
    match context {
        Ok(context) => print_json(&context),
        Err(e) => report_error(&e),
    }
}
