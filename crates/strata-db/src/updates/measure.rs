//! Performance measure update builder.

use serde::Serialize;
use strata_core::entities::{PerformanceMeasure, Targets};

#[derive(Debug, Clone, Default, Serialize)]
pub struct MeasureUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Targets>,
}

impl MeasureUpdate {
    pub fn apply(&self, measure: &mut PerformanceMeasure) {
        if let Some(name) = &self.name {
            measure.name.clone_from(name);
        }
        if let Some(weight) = self.weight {
            measure.weight = weight;
        }
        if let Some(targets) = &self.targets {
            measure.targets = targets.clone();
        }
    }
}

#[derive(Default)]
pub struct MeasureUpdateBuilder(MeasureUpdate);

impl MeasureUpdateBuilder {
    pub fn new() -> Self {
        Self(MeasureUpdate::default())
    }

    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    pub fn weight(mut self, val: f64) -> Self {
        self.0.weight = Some(val);
        self
    }

    pub fn targets(mut self, val: Targets) -> Self {
        self.0.targets = Some(val);
        self
    }

    pub fn build(self) -> MeasureUpdate {
        self.0
    }
}
