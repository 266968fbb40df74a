use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Targets;
use crate::rules::visibility::{Scope, Scoped};
use crate::rules::weight::Weighted;

/// A main activity under an initiative. Budgeted through sub-activities,
/// or through a single legacy `ActivityBudget` when it has none.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MainActivity {
    pub id: String,
    pub initiative_id: String,
    pub name: String,
    pub weight: f64,
    #[serde(flatten)]
    pub targets: Targets,
    /// `None` = default activity visible to every organization.
    pub organization_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scoped for MainActivity {
    fn scope(&self) -> Scope {
        Scope::from_organization(self.organization_id.as_deref())
    }
}

impl Weighted for MainActivity {
    fn weight(&self) -> f64 {
        self.weight
    }
}
