//! Command implementations and dispatch.

pub mod browse;
pub mod check;
pub mod compile;
pub mod facets;
pub mod fields;
pub mod init;

use std::{path::Path, process::ExitCode};

use super::{args::Commands, context::CommandContext};

/// Loads the command context and dispatches to the selected subcommand.
pub fn run(command: &Commands, config_file: Option<&Path>) -> ExitCode {
    let loaded = if matches!(command, Commands::Init(_)) {
        CommandContext::load_cwd_only()
    } else {
        CommandContext::load(config_file)
    };
    let ctx = match loaded {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    match command {
        Commands::Compile(cmd) => compile::run(&ctx, cmd),
        Commands::Facets(cmd) => facets::run(&ctx, cmd),
        Commands::Browse(cmd) => browse::run(&ctx, cmd),
        Commands::Fields(cmd) => fields::run(&ctx, cmd),
        Commands::Init(cmd) => init::run(&ctx, cmd),
        Commands::Check => check::run(&ctx),
    }
}
