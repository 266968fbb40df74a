//! Inbound records for create operations.
//!
//! One struct per entity type, field name → value, as they arrive from the
//! transport layer. IDs and timestamps are assigned by the store; derived
//! fields are never accepted.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{CostDetails, FundingLines, Targets};
use crate::enums::{
    AccommodationService, ActivityType, OrgRole, ParticipantCostType, PrintingDocumentType,
    ProcurementCategory, ProcurementUnit, ReviewStatus, SessionCostType, SupervisorCostType,
    TripType,
};

const fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewOrganization {
    pub name: String,
    #[serde(default)]
    pub org_type: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub vision: Option<String>,
    #[serde(default)]
    pub mission: Option<String>,
    #[serde(default)]
    pub core_values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewMembership {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub organization_id: String,
    pub role: OrgRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewObjective {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub weight: f64,
    #[serde(default)]
    pub planner_weight: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewProgram {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub strategic_objective_id: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewInitiativeFeed {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub strategic_objective_id: Option<String>,
    #[serde(default = "yes")]
    pub is_active: bool,
}

/// Initiative draft. Exactly one of `strategic_objective_id` / `program_id`
/// must be set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewInitiative {
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub strategic_objective_id: Option<String>,
    #[serde(default)]
    pub program_id: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub initiative_feed_id: Option<String>,
}

/// Performance measure draft. A missing organization defaults to the requester's.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewMeasure {
    pub initiative_id: String,
    pub name: String,
    pub weight: f64,
    #[serde(flatten)]
    pub targets: Targets,
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// Main activity draft. A missing organization defaults to the requester's.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewActivity {
    pub initiative_id: String,
    pub name: String,
    pub weight: f64,
    #[serde(flatten)]
    pub targets: Targets,
    #[serde(default)]
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewSubActivity {
    pub main_activity_id: String,
    pub name: String,
    pub activity_type: ActivityType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub funding: FundingLines,
    #[serde(flatten)]
    pub details: CostDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewActivityBudget {
    pub activity_id: String,
    #[serde(default)]
    pub sub_activity_label: Option<String>,
    #[serde(default)]
    pub activity_type: Option<ActivityType>,
    #[serde(flatten)]
    pub funding: FundingLines,
    #[serde(flatten)]
    pub details: CostDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewPlan {
    pub organization_id: String,
    pub planner_name: String,
    pub plan_type: String,
    #[serde(default)]
    pub executive_name: Option<String>,
    #[serde(default)]
    pub strategic_objective_id: Option<String>,
    #[serde(default)]
    pub program_id: Option<String>,
    pub fiscal_year: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(default)]
    pub selected_objectives: Vec<String>,
    #[serde(default)]
    pub selected_objectives_weights: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewPlanReview {
    pub evaluator_id: String,
    pub status: ReviewStatus,
    #[serde(default)]
    pub feedback: Option<String>,
    /// Defaults to the time the review is recorded.
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewLocation {
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub is_hardship_area: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewLandTransport {
    pub origin_id: String,
    pub destination_id: String,
    pub trip_type: TripType,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewAirTransport {
    pub origin_id: String,
    pub destination_id: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewPerDiem {
    pub location_id: String,
    pub amount: f64,
    #[serde(default)]
    pub hardship_allowance_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewAccommodation {
    pub location_id: String,
    pub service_type: AccommodationService,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewParticipantCost {
    pub cost_type: ParticipantCostType,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewSessionCost {
    pub cost_type: SessionCostType,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewPrintingCost {
    pub document_type: PrintingDocumentType,
    pub price_per_page: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewSupervisorCost {
    pub cost_type: SupervisorCostType,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewProcurementItem {
    pub category: ProcurementCategory,
    pub name: String,
    pub unit: ProcurementUnit,
    pub unit_price: f64,
}
