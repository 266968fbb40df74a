use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ActivityType, BudgetCalculationType};

/// The four funding sources and the two estimated-cost fields of a budget line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FundingLines {
    pub budget_calculation_type: BudgetCalculationType,
    #[serde(default)]
    pub estimated_cost_with_tool: f64,
    #[serde(default)]
    pub estimated_cost_without_tool: f64,
    #[serde(default)]
    pub government_treasury: f64,
    #[serde(default)]
    pub sdg_funding: f64,
    #[serde(default)]
    pub partners_funding: f64,
    #[serde(default)]
    pub other_funding: f64,
}

/// Costing-tool inputs kept verbatim for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CostDetails {
    pub training_details: Option<serde_json::Value>,
    pub meeting_workshop_details: Option<serde_json::Value>,
    pub procurement_details: Option<serde_json::Value>,
    pub printing_details: Option<serde_json::Value>,
    pub supervision_details: Option<serde_json::Value>,
    pub partners_details: Option<serde_json::Value>,
}

/// One costed line item of a main activity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SubActivity {
    pub id: String,
    pub main_activity_id: String,
    pub name: String,
    pub activity_type: ActivityType,
    pub description: Option<String>,
    #[serde(flatten)]
    pub funding: FundingLines,
    #[serde(flatten)]
    pub details: CostDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single budget record of an activity, predating sub-activities.
///
/// Only read when the activity has no sub-activities.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ActivityBudget {
    pub id: String,
    pub activity_id: String,
    pub sub_activity_label: Option<String>,
    pub activity_type: Option<ActivityType>,
    #[serde(flatten)]
    pub funding: FundingLines,
    #[serde(flatten)]
    pub details: CostDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
