use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A top-level strategic objective carrying a percentage weight.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StrategicObjective {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub weight: f64,
    /// Planner override of `weight`.
    pub planner_weight: Option<f64>,
    /// Global template rather than an organization-specific copy.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StrategicObjective {
    /// Weight used for downstream ceilings: the planner override if set.
    #[must_use]
    pub fn effective_weight(&self) -> f64 {
        self.planner_weight.unwrap_or(self.weight)
    }
}
