//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default page size for list operations.
const fn default_limit() -> u32 {
    50
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Maximum rows returned by list operations that take no explicit limit.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}
