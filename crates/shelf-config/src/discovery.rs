//! Configuration file discovery.
//!
//! Finds `.shelf.toml` files between the working directory and the filesystem root,
//! then falls back to `~/.shelf.toml` with the lowest precedence.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".shelf.toml";

/// Discovers all configuration files relevant to the given directory.
///
/// Paths are returned closest-first. Walking stops at a file with `root = true`, in which
/// case the global file is not consulted either.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs: Vec<PathBuf> = Vec::new();

    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if !candidate.is_file() {
            continue;
        }
        let stop = is_root_config(&candidate);
        configs.push(candidate);
        if stop {
            return configs;
        }
    }

    if let Some(global) = global_config_path()
        && global.is_file()
        && !configs.contains(&global)
    {
        configs.push(global);
    }

    configs
}

/// Returns the path to the global configuration file (`~/.shelf.toml`).
///
/// Returns `None` if the home directory cannot be determined.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Checks if a path is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDir;

    /// Discovers configs under `dir`, ignoring whatever global file the host has.
    fn local_configs(dir: &Path) -> Vec<PathBuf> {
        discover_config_files(dir)
            .into_iter()
            .filter(|p| !is_global_config(p))
            .collect()
    }

    #[test]
    fn finds_nothing_without_configs() {
        let test_dir = TestDir::new();
        let subdir = test_dir.create_dir("a/b");
        assert!(local_configs(&subdir).is_empty());
    }

    #[test]
    fn closest_config_comes_first() {
        let test_dir = TestDir::new();
        let outer = test_dir.create_config("", "# outer\n");
        let inner = test_dir.create_config("catalogs/local", "# inner\n");
        let working_dir = test_dir.create_dir("catalogs/local/deep");

        assert_eq!(local_configs(&working_dir), vec![inner, outer]);
    }

    #[test]
    fn root_config_stops_discovery() {
        let test_dir = TestDir::new();
        test_dir.create_config("", "# ignored\n");
        let root = test_dir.create_config("project", "root = true\n");
        let working_dir = test_dir.create_dir("project/src");

        assert_eq!(discover_config_files(&working_dir), vec![root]);
    }

    #[test]
    fn directory_named_like_config_is_skipped() {
        let test_dir = TestDir::new();
        test_dir.create_dir(CONFIG_FILENAME);
        assert!(local_configs(test_dir.path()).is_empty());
    }

    #[test]
    fn global_path_uses_config_filename() {
        let path = global_config_path().unwrap();
        assert!(path.ends_with(CONFIG_FILENAME));
        assert!(is_global_config(&path));
        assert!(!is_global_config(Path::new("/elsewhere/.shelf.toml")));
    }
}
