//! Sub-activity update builder.

use serde::Serialize;
use strata_core::entities::{CostDetails, FundingLines, SubActivity};
use strata_core::enums::ActivityType;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubActivityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<ActivityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding: Option<FundingLines>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CostDetails>,
}

impl SubActivityUpdate {
    pub fn apply(&self, sub_activity: &mut SubActivity) {
        if let Some(name) = &self.name {
            sub_activity.name.clone_from(name);
        }
        if let Some(activity_type) = self.activity_type {
            sub_activity.activity_type = activity_type;
        }
        if let Some(description) = &self.description {
            sub_activity.description.clone_from(description);
        }
        if let Some(funding) = &self.funding {
            sub_activity.funding = funding.clone();
        }
        if let Some(details) = &self.details {
            sub_activity.details = details.clone();
        }
    }
}

#[derive(Default)]
pub struct SubActivityUpdateBuilder(SubActivityUpdate);

impl SubActivityUpdateBuilder {
    pub fn new() -> Self {
        Self(SubActivityUpdate::default())
    }

    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    pub fn activity_type(mut self, val: ActivityType) -> Self {
        self.0.activity_type = Some(val);
        self
    }

    pub fn description(mut self, val: Option<String>) -> Self {
        self.0.description = Some(val);
        self
    }

    pub fn funding(mut self, val: FundingLines) -> Self {
        self.0.funding = Some(val);
        self
    }

    pub fn details(mut self, val: CostDetails) -> Self {
        self.0.details = Some(val);
        self
    }

    pub fn build(self) -> SubActivityUpdate {
        self.0
    }
}
