//! Command-line interface for the `shelf` query compiler.

mod cli;

use std::{io::Write, process::ExitCode};

use env_logger::Builder;
use log::LevelFilter;

use crate::cli::{args::parse_cli, commands};

fn main() -> ExitCode {
    let cli = parse_cli();
    init_logging(cli.verbose);
    commands::run(&cli.command, cli.config.as_deref())
}

/// Installs the logger; each `-v` raises the level by one step from `error`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}
