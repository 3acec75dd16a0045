//! Runtime configuration.
//!
//! Resolved from the environment, then overridden by command-line flags:
//! - `HBNB_FILE_PATH` - JSON file backing the object store (default: `file.json`)

use std::path::PathBuf;

use crate::storage::DEFAULT_FILE_PATH;

pub const FILE_PATH_ENV: &str = "HBNB_FILE_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file_path: PathBuf,
}

impl Config {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let file_path = std::env::var_os(FILE_PATH_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_PATH));
        Self { file_path }
    }

    /// Replace the file path when one was given explicitly.
    pub fn with_file_path(mut self, file_path: Option<PathBuf>) -> Self {
        if let Some(file_path) = file_path {
            self.file_path = file_path;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
        }
    }
}
