//! Shared context for running CLI commands.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use shelf_compile::QueryCompiler;
use shelf_config::{Config, discover_config_files};
use shelf_cql::CqlNode;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Config files that were merged, highest precedence first.
    pub config_files: Vec<PathBuf>,
    /// Loaded configuration (default if no config files were found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    ///
    /// An explicit `config_file` replaces discovery.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config_files = match config_file {
            Some(path) => vec![path.to_path_buf()],
            None => discover_config_files(&cwd),
        };
        let config = Config::load_from_files(&config_files).map_err(|e| {
            eprintln!("error: failed to load configuration: {e}");
            ExitCode::FAILURE
        })?;
        Ok(Self {
            cwd,
            config_files,
            config,
        })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used by `init`, which should work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config_files: Vec::new(),
            config: Config::default(),
        })
    }

    /// Builds the query compiler for the loaded configuration.
    pub fn compiler(&self) -> Result<QueryCompiler, ExitCode> {
        QueryCompiler::from_config(&self.config).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Reads an expression tree and builds the compiler to run it through.
    pub fn prepare(&self, input: &str) -> Result<(CqlNode, QueryCompiler), ExitCode> {
        let tree = read_tree(input)?;
        let compiler = self.compiler()?;
        Ok((tree, compiler))
    }

    /// Ensures the resource type is defined in configuration.
    pub fn require_resource(&self, resource: &str) -> Result<(), ExitCode> {
        if self.config.resources.contains_key(resource) {
            return Ok(());
        }
        eprintln!("error: resource '{resource}' is not defined in configuration");
        if self.config_files.is_empty() {
            eprintln!("Run 'shelf init' to create a configuration file.");
        }
        Err(ExitCode::FAILURE)
    }
}

/// Reads a JSON expression tree from a file, or from stdin for `-`.
fn read_tree(input: &str) -> Result<CqlNode, ExitCode> {
    let contents = if input == "-" {
        io::read_to_string(io::stdin())
    } else {
        fs::read_to_string(input)
    }
    .map_err(|e| {
        eprintln!("error: failed to read {input}: {e}");
        ExitCode::FAILURE
    })?;

    serde_json::from_str(&contents).map_err(|e| {
        eprintln!("error: invalid expression tree in {input}: {e}");
        ExitCode::FAILURE
    })
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}
