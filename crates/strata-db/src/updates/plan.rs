//! Plan update builder.
//!
//! Status is not updatable here; it moves only through submit and review.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use strata_core::entities::Plan;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_objectives: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_objectives_weights: Option<BTreeMap<String, f64>>,
}

impl PlanUpdate {
    /// Whether the selection or its weights are replaced.
    #[must_use]
    pub const fn touches_selection(&self) -> bool {
        self.selected_objectives.is_some() || self.selected_objectives_weights.is_some()
    }

    pub fn apply(&self, plan: &mut Plan) {
        if let Some(planner_name) = &self.planner_name {
            plan.planner_name.clone_from(planner_name);
        }
        if let Some(plan_type) = &self.plan_type {
            plan.plan_type.clone_from(plan_type);
        }
        if let Some(executive_name) = &self.executive_name {
            plan.executive_name.clone_from(executive_name);
        }
        if let Some(fiscal_year) = &self.fiscal_year {
            plan.fiscal_year.clone_from(fiscal_year);
        }
        if let Some(from_date) = self.from_date {
            plan.from_date = from_date;
        }
        if let Some(to_date) = self.to_date {
            plan.to_date = to_date;
        }
        if let Some(selected) = &self.selected_objectives {
            plan.selected_objectives.clone_from(selected);
        }
        if let Some(weights) = &self.selected_objectives_weights {
            plan.selected_objectives_weights.clone_from(weights);
        }
    }
}

#[derive(Default)]
pub struct PlanUpdateBuilder(PlanUpdate);

impl PlanUpdateBuilder {
    pub fn new() -> Self {
        Self(PlanUpdate::default())
    }

    pub fn planner_name(mut self, val: impl Into<String>) -> Self {
        self.0.planner_name = Some(val.into());
        self
    }

    pub fn plan_type(mut self, val: impl Into<String>) -> Self {
        self.0.plan_type = Some(val.into());
        self
    }

    pub fn executive_name(mut self, val: Option<String>) -> Self {
        self.0.executive_name = Some(val);
        self
    }

    pub fn fiscal_year(mut self, val: impl Into<String>) -> Self {
        self.0.fiscal_year = Some(val.into());
        self
    }

    pub fn from_date(mut self, val: NaiveDate) -> Self {
        self.0.from_date = Some(val);
        self
    }

    pub fn to_date(mut self, val: NaiveDate) -> Self {
        self.0.to_date = Some(val);
        self
    }

    pub fn selected_objectives(mut self, val: Vec<String>) -> Self {
        self.0.selected_objectives = Some(val);
        self
    }

    pub fn selected_objectives_weights(mut self, val: BTreeMap<String, f64>) -> Self {
        self.0.selected_objectives_weights = Some(val);
        self
    }

    pub fn build(self) -> PlanUpdate {
        self.0
    }
}
