//! Main activity update builder.

use serde::Serialize;
use strata_core::entities::{MainActivity, Targets};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Targets>,
}

impl ActivityUpdate {
    pub fn apply(&self, activity: &mut MainActivity) {
        if let Some(name) = &self.name {
            activity.name.clone_from(name);
        }
        if let Some(weight) = self.weight {
            activity.weight = weight;
        }
        if let Some(targets) = &self.targets {
            activity.targets = targets.clone();
        }
    }
}

#[derive(Default)]
pub struct ActivityUpdateBuilder(ActivityUpdate);

impl ActivityUpdateBuilder {
    pub fn new() -> Self {
        Self(ActivityUpdate::default())
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

    pub fn build(self) -> ActivityUpdate {
        self.0
    }
}
