//! CLI support for the `shelf` binary.

pub mod args;
pub mod commands;
pub mod context;
pub mod output;
