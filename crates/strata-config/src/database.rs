//! Local libSQL database configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    ".strata/strata.db".to_string()
}

const fn default_foreign_keys() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database file path, or `:memory:` for a throwaway database.
    #[serde(default = "default_path")]
    pub path: String,

    /// Whether to enable `PRAGMA foreign_keys` on every connection.
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            foreign_keys: default_foreign_keys(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }

    /// Directory the database file lives in, if it needs to exist beforehand.
    #[must_use]
    pub fn parent_dir(&self) -> Option<PathBuf> {
        if self.is_in_memory() {
            return None;
        }
        PathBuf::from(&self.path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
    }
}
