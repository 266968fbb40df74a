use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::StrategicObjective;
use crate::enums::{PlanStatus, ReviewStatus};

/// An organization's plan for one fiscal year.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Plan {
    pub id: String,
    pub organization_id: String,
    pub planner_name: String,
    pub plan_type: String,
    pub executive_name: Option<String>,
    /// Single objective recorded by plans created before multi-selection.
    pub strategic_objective_id: Option<String>,
    pub program_id: Option<String>,
    pub fiscal_year: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub status: PlanStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub selected_objectives: Vec<String>,
    /// Planner weight overrides keyed by objective id.
    pub selected_objectives_weights: BTreeMap<String, f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Objective ids this plan covers, falling back to the legacy single objective.
    #[must_use]
    pub fn objective_ids(&self) -> Vec<&str> {
        if self.selected_objectives.is_empty() {
            self.strategic_objective_id.as_deref().into_iter().collect()
        } else {
            self.selected_objectives.iter().map(String::as_str).collect()
        }
    }

    /// Weight of `objective` inside this plan: the override if one was given,
    /// else the objective's own effective weight.
    #[must_use]
    pub fn weight_for(&self, objective: &StrategicObjective) -> f64 {
        self.selected_objectives_weights
            .get(&objective.id)
            .copied()
            .unwrap_or_else(|| objective.effective_weight())
    }
}

/// One evaluator's verdict on a submitted plan.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PlanReview {
    pub id: String,
    pub plan_id: String,
    /// Membership id of the evaluator.
    pub evaluator_id: Option<String>,
    pub status: ReviewStatus,
    pub feedback: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}
