//! Clap argument definitions for the `shelf` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Inspect how CQL queries compile into search engine queries")]
pub struct Cli {
    /// Log verbosity (-v warn, -vv info, -vvv debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read this configuration file instead of discovering .shelf.toml files
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the expression tree comes from and what it is compiled against.
#[derive(Args, Debug, Clone)]
pub struct QueryInput {
    /// JSON expression tree file, or - for stdin
    pub input: String,

    /// Resource type to compile against
    #[arg(short = 'r', long)]
    pub resource: String,
}

/// Arguments for `shelf compile`.
#[derive(Args, Debug, Clone)]
pub struct CompileCommand {
    #[command(flatten)]
    /// Expression tree and resource.
    pub query: QueryInput,

    /// Print the canonical CQL text and parsed tree before the compiled query
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for `shelf facets`.
#[derive(Args, Debug, Clone)]
pub struct FacetsCommand {
    #[command(flatten)]
    /// Expression tree and resource.
    pub query: QueryInput,

    /// Facet to aggregate, as name or name:limit (repeatable)
    #[arg(short = 'f', long = "facet", required = true)]
    pub facets: Vec<String>,
}

/// Arguments for `shelf browse`.
#[derive(Args, Debug, Clone)]
pub struct BrowseCommand {
    #[command(flatten)]
    /// Expression tree and resource.
    pub query: QueryInput,

    /// Field the browse pages over
    #[arg(long)]
    pub field: String,

    /// Total records requested [default: browse.default_limit]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Records wanted before the anchor when browsing around it [default: limit / 2]
    #[arg(long)]
    pub preceding: Option<usize>,

    /// Browse call numbers: require a numeric anchor and bound ranges by the configured offset
    #[arg(long)]
    pub call_number: bool,
}

/// Arguments for `shelf fields`.
#[derive(Args, Debug, Clone)]
pub struct FieldsCommand {
    /// Only show this resource type
    #[arg(short = 'r', long)]
    pub resource: Option<String>,
}

/// Arguments for `shelf init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `shelf` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Compile an expression tree and print the search query as JSON
    #[command(after_help = "\
INPUT FORMAT:
  The expression tree is JSON, as produced by an external CQL parser:

  {\"type\": \"boolean\", \"operator\": \"and\",
   \"left\":  {\"type\": \"term\", \"index\": \"title\", \"comparator\": \"all\", \"term\": \"dune\"},
   \"right\": {\"type\": \"term\", \"index\": \"languages\", \"comparator\": \"==\", \"term\": \"eng\"}}

EXAMPLES:
  shelf compile query.json -r instance
  shelf compile - -r instance --explain < query.json")]
    Compile(CompileCommand),

    /// Print facet aggregations for a compiled expression tree
    Facets(FacetsCommand),

    /// Print the browse context recovered from a compiled expression tree
    Browse(BrowseCommand),

    /// List catalog fields, aliases and groups
    Fields(FieldsCommand),

    /// Initialize shelf configuration in current directory
    Init(InitCommand),

    /// Validate configuration and report warnings
    Check,
}

/// Parses CLI arguments, exiting on usage errors.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
