//! Objective update builder.

use serde::Serialize;
use strata_core::entities::StrategicObjective;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectiveUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// `Some(None)` clears the override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planner_weight: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl ObjectiveUpdate {
    pub fn apply(&self, objective: &mut StrategicObjective) {
        if let Some(title) = &self.title {
            objective.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            objective.description.clone_from(description);
        }
        if let Some(weight) = self.weight {
            objective.weight = weight;
        }
        if let Some(planner_weight) = self.planner_weight {
            objective.planner_weight = planner_weight;
        }
        if let Some(is_default) = self.is_default {
            objective.is_default = is_default;
        }
    }
}

#[derive(Default)]
pub struct ObjectiveUpdateBuilder(ObjectiveUpdate);

impl ObjectiveUpdateBuilder {
    pub fn new() -> Self {
        Self(ObjectiveUpdate::default())
    }

    pub fn title(mut self, val: impl Into<String>) -> Self {
        self.0.title = Some(val.into());
        self
    }

    pub fn description(mut self, val: Option<String>) -> Self {
        self.0.description = Some(val);
        self
    }

    pub fn weight(mut self, val: f64) -> Self {
        self.0.weight = Some(val);
        self
    }

    pub fn planner_weight(mut self, val: Option<f64>) -> Self {
        self.0.planner_weight = Some(val);
        self
    }

    pub fn is_default(mut self, val: bool) -> Self {
        self.0.is_default = Some(val);
        self
    }

    pub fn build(self) -> ObjectiveUpdate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_set_fields_serialize() {
        let update = ObjectiveUpdateBuilder::new().planner_weight(None).build();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"planner_weight": null}));
    }
}
