//! Project configuration stored in `.sociogram/config.json`.

use serde::{Deserialize, Serialize};
use sociogram_graph::{IngestPolicy, TraversalStrategy, UserId};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_DIR: &str = ".sociogram";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings shared by every command. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    /// Dataset read when `--data` is not given.
    pub dataset: PathBuf,
    pub policy: IngestPolicy,
    pub traversal: TraversalStrategy,
    /// Depth used by `reach` and `report` when none is given.
    pub depth: usize,
    pub report_user: UserId,
    pub report_other: UserId,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            dataset: PathBuf::from("veriseti.txt"),
            policy: IngestPolicy::Lenient,
            traversal: TraversalStrategy::Recursive,
            depth: 2,
            report_user: 101,
            report_other: 102,
        }
    }
}

impl Config {
    /// Location of the config file under `root`.
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Reads a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `explicit` if given, otherwise the project config under `root`
    /// when it exists, otherwise the defaults.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let path = Self::path_in(root);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.dataset, PathBuf::from("veriseti.txt"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        fs::write(
            Config::path_in(dir.path()),
            r#"{ "policy": "strict", "traversal": "iterative", "depth": 3 }"#,
        )
        .unwrap();

        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.policy, IngestPolicy::Strict);
        assert_eq!(config.traversal, TraversalStrategy::Iterative);
        assert_eq!(config.depth, 3);
        assert_eq!(config.report_user, 101);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = Config::load(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
