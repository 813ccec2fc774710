//! Implementation of `shelf compile`.

use std::process::ExitCode;

use crate::cli::{
    args::CompileCommand,
    context::CommandContext,
    output::{print_json, report_error},
};

/// Compiles an expression tree and prints the search query.
pub fn run(ctx: &CommandContext, cmd: &CompileCommand) -> ExitCode {
    let (tree, compiler) = match ctx.prepare(&cmd.query.input) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };

    if cmd.explain {
        println!("CQL: {}", tree.to_cql_string());
        println!();
        println!("Tree:");
        print!("{tree}");
        println!();
        println!("Query:");
    }

    match compiler.compile_query(&tree, &cmd.query.resource) {
        Ok(search) => print_json(&search),
        Err(e) => report_error(&e),
    }
}
