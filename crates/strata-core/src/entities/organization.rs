use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::OrgRole;

/// A node in the organization forest. `parent_id` links to the parent unit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub org_type: Option<String>,
    pub parent_id: Option<String>,
    pub vision: Option<String>,
    pub mission: Option<String>,
    pub core_values: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's membership and role inside one organization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OrganizationUser {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_id: String,
    pub role: OrgRole,
    pub created_at: DateTime<Utc>,
}

impl OrganizationUser {
    /// Full name, falling back to the username when both name parts are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
