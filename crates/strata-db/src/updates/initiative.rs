//! Initiative update builder.

use serde::Serialize;
use strata_core::entities::{InitiativeParent, StrategicInitiative};

#[derive(Debug, Clone, Default, Serialize)]
pub struct InitiativeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Moving an initiative replaces its parent as a whole.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<InitiativeParent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiative_feed_id: Option<Option<String>>,
}

impl InitiativeUpdate {
    pub fn apply(&self, initiative: &mut StrategicInitiative) {
        if let Some(name) = &self.name {
            initiative.name.clone_from(name);
        }
        if let Some(weight) = self.weight {
            initiative.weight = weight;
        }
        if let Some(parent) = &self.parent {
            initiative.parent = parent.clone();
        }
        if let Some(organization_id) = &self.organization_id {
            initiative.organization_id.clone_from(organization_id);
        }
        if let Some(is_default) = self.is_default {
            initiative.is_default = is_default;
        }
        if let Some(feed_id) = &self.initiative_feed_id {
            initiative.initiative_feed_id.clone_from(feed_id);
        }
    }
}

#[derive(Default)]
pub struct InitiativeUpdateBuilder(InitiativeUpdate);

impl InitiativeUpdateBuilder {
    pub fn new() -> Self {
        Self(InitiativeUpdate::default())
    }

    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    pub fn weight(mut self, val: f64) -> Self {
        self.0.weight = Some(val);
        self
    }

    pub fn parent(mut self, val: InitiativeParent) -> Self {
        self.0.parent = Some(val);
        self
    }

    pub fn organization_id(mut self, val: Option<String>) -> Self {
        self.0.organization_id = Some(val);
        self
    }

    pub fn is_default(mut self, val: bool) -> Self {
        self.0.is_default = Some(val);
        self
    }

    pub fn initiative_feed_id(mut self, val: Option<String>) -> Self {
        self.0.initiative_feed_id = Some(val);
        self
    }

    pub fn build(self) -> InitiativeUpdate {
        self.0
    }
}
