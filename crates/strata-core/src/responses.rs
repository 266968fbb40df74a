//! Outbound views returned by read operations.
//!
//! Each view flattens its entity and appends the derived fields computed on
//! read. Child lists arrive already passed through
//! [`filter_visible`](crate::rules::visibility::filter_visible), so every
//! weight total here is the sum of exactly the children that are displayed.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{
    Accommodation, ActivityBudget, AirTransport, LandTransport, MainActivity, Organization,
    OrganizationUser, ParticipantCost, PerDiem, PerformanceMeasure, Plan, PlanReview,
    PrintingCost, ProcurementItem, Program, SessionCost, StrategicInitiative, StrategicObjective,
    SubActivity, SupervisorCost,
};
use crate::rules::funding::{FundingSource, FundingSummary};

/// Name shown for a review without a resolvable evaluator.
pub const SYSTEM_EVALUATOR: &str = "System";

// ---------------------------------------------------------------------------
// Planning hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MeasureView {
    #[serde(flatten)]
    pub measure: PerformanceMeasure,
    pub organization_name: Option<String>,
    pub quarterly_sum: f64,
}

impl MeasureView {
    #[must_use]
    pub fn new(measure: PerformanceMeasure, organization_name: Option<String>) -> Self {
        let quarterly_sum = measure.targets.quarterly_sum();
        Self {
            measure,
            organization_name,
            quarterly_sum,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SubActivityView {
    #[serde(flatten)]
    pub sub_activity: SubActivity,
    #[serde(flatten)]
    pub funding: FundingSummary,
}

impl From<SubActivity> for SubActivityView {
    fn from(sub_activity: SubActivity) -> Self {
        let funding = sub_activity.funding.summary();
        Self {
            sub_activity,
            funding,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BudgetView {
    #[serde(flatten)]
    pub budget: ActivityBudget,
    #[serde(flatten)]
    pub funding: FundingSummary,
}

impl From<ActivityBudget> for BudgetView {
    fn from(budget: ActivityBudget) -> Self {
        let funding = budget.funding.summary();
        Self { budget, funding }
    }
}

/// A main activity with its funding rolled up from whichever source applies.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: MainActivity,
    pub organization_name: Option<String>,
    pub quarterly_sum: f64,
    pub sub_activities: Vec<SubActivityView>,
    /// Present only when the activity has no sub-activities.
    pub legacy_budget: Option<BudgetView>,
    pub total_budget: f64,
    pub total_funding: f64,
    pub funding_gap: f64,
}

impl ActivityView {
    #[must_use]
    pub fn new(activity: MainActivity, organization_name: Option<String>, source: FundingSource) -> Self {
        let quarterly_sum = activity.targets.quarterly_sum();
        let summary = source.summary();
        let (sub_activities, legacy_budget) = match source {
            FundingSource::LegacyBudget(budget) => (Vec::new(), Some(BudgetView::from(budget))),
            FundingSource::SubActivityList(subs) => {
                (subs.into_iter().map(SubActivityView::from).collect(), None)
            }
        };
        Self {
            activity,
            organization_name,
            quarterly_sum,
            sub_activities,
            legacy_budget,
            total_budget: summary.estimated_cost,
            total_funding: summary.total_funding,
            funding_gap: summary.funding_gap,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct InitiativeView {
    #[serde(flatten)]
    pub initiative: StrategicInitiative,
    pub organization_name: Option<String>,
    pub initiative_feed_name: Option<String>,
    pub performance_measures: Vec<MeasureView>,
    pub main_activities: Vec<ActivityView>,
    pub total_measures_weight: f64,
    pub total_activities_weight: f64,
}

impl InitiativeView {
    #[must_use]
    pub fn new(
        initiative: StrategicInitiative,
        organization_name: Option<String>,
        initiative_feed_name: Option<String>,
        performance_measures: Vec<MeasureView>,
        main_activities: Vec<ActivityView>,
    ) -> Self {
        let total_measures_weight = performance_measures.iter().map(|m| m.measure.weight).sum();
        let total_activities_weight = main_activities.iter().map(|a| a.activity.weight).sum();
        Self {
            initiative,
            organization_name,
            initiative_feed_name,
            performance_measures,
            main_activities,
            total_measures_weight,
            total_activities_weight,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProgramView {
    #[serde(flatten)]
    pub program: Program,
    pub strategic_objective_title: Option<String>,
    pub initiatives: Vec<InitiativeView>,
}

/// An objective with its effective weight, its programs, and the visible
/// initiatives directly under it.
///
/// Inside a plan, `effective_weight` is the plan's override when one exists.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ObjectiveView {
    #[serde(flatten)]
    pub objective: StrategicObjective,
    pub effective_weight: f64,
    pub programs: Vec<ProgramView>,
    pub initiatives: Vec<InitiativeView>,
    pub total_initiatives_weight: f64,
}

impl ObjectiveView {
    #[must_use]
    pub fn new(
        objective: StrategicObjective,
        effective_weight: f64,
        programs: Vec<ProgramView>,
        initiatives: Vec<InitiativeView>,
    ) -> Self {
        let total_initiatives_weight = initiatives.iter().map(|i| i.initiative.weight).sum();
        Self {
            objective,
            effective_weight,
            programs,
            initiatives,
            total_initiatives_weight,
        }
    }
}

// ---------------------------------------------------------------------------
// Plans and reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PlanReviewView {
    #[serde(flatten)]
    pub review: PlanReview,
    pub evaluator_name: String,
}

impl PlanReviewView {
    /// `evaluator` is the membership behind `review.evaluator_id`, if it still exists.
    #[must_use]
    pub fn new(review: PlanReview, evaluator: Option<&OrganizationUser>) -> Self {
        let evaluator_name =
            evaluator.map_or_else(|| SYSTEM_EVALUATOR.to_string(), OrganizationUser::display_name);
        Self {
            review,
            evaluator_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PlanView {
    #[serde(flatten)]
    pub plan: Plan,
    pub organization_name: Option<String>,
    pub selected_objectives_data: Vec<ObjectiveView>,
    pub reviews: Vec<PlanReviewView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OrganizationView {
    #[serde(flatten)]
    pub organization: Organization,
    pub parent_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Cost reference tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LandTransportView {
    #[serde(flatten)]
    pub entry: LandTransport,
    pub origin_name: String,
    pub destination_name: String,
    pub trip_type_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AirTransportView {
    #[serde(flatten)]
    pub entry: AirTransport,
    pub origin_name: String,
    pub destination_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PerDiemView {
    #[serde(flatten)]
    pub entry: PerDiem,
    pub location_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AccommodationView {
    #[serde(flatten)]
    pub entry: Accommodation,
    pub location_name: String,
    pub service_type_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ParticipantCostView {
    #[serde(flatten)]
    pub entry: ParticipantCost,
    pub cost_type_label: String,
}

impl From<ParticipantCost> for ParticipantCostView {
    fn from(entry: ParticipantCost) -> Self {
        let cost_type_label = entry.cost_type.label().to_string();
        Self {
            entry,
            cost_type_label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SessionCostView {
    #[serde(flatten)]
    pub entry: SessionCost,
    pub cost_type_label: String,
}

impl From<SessionCost> for SessionCostView {
    fn from(entry: SessionCost) -> Self {
        let cost_type_label = entry.cost_type.label().to_string();
        Self {
            entry,
            cost_type_label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PrintingCostView {
    #[serde(flatten)]
    pub entry: PrintingCost,
    pub document_type_label: String,
}

impl From<PrintingCost> for PrintingCostView {
    fn from(entry: PrintingCost) -> Self {
        let document_type_label = entry.document_type.label().to_string();
        Self {
            entry,
            document_type_label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SupervisorCostView {
    #[serde(flatten)]
    pub entry: SupervisorCost,
    pub cost_type_label: String,
}

impl From<SupervisorCost> for SupervisorCostView {
    fn from(entry: SupervisorCost) -> Self {
        let cost_type_label = entry.cost_type.label().to_string();
        Self {
            entry,
            cost_type_label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProcurementItemView {
    #[serde(flatten)]
    pub entry: ProcurementItem,
    pub category_label: String,
    pub unit_label: String,
}

impl From<ProcurementItem> for ProcurementItemView {
    fn from(entry: ProcurementItem) -> Self {
        let category_label = entry.category.label().to_string();
        let unit_label = entry.unit.label().to_string();
        Self {
            entry,
            category_label,
            unit_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CostDetails, FundingLines, InitiativeParent, Targets};
    use crate::enums::{ActivityType, BudgetCalculationType, OrgRole, ReviewStatus, TargetType};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn targets() -> Targets {
        Targets {
            baseline: None,
            target_type: TargetType::Cumulative,
            q1_target: 1.0,
            q2_target: 2.0,
            q3_target: 3.0,
            q4_target: 4.0,
            annual_target: 10.0,
            selected_months: vec![],
            selected_quarters: vec!["Q1".into()],
        }
    }

    fn activity(weight: f64) -> MainActivity {
        MainActivity {
            id: "act-1".into(),
            initiative_id: "ini-1".into(),
            name: "Train staff".into(),
            weight,
            targets: targets(),
            organization_id: Some("org-a".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn lines(cost: f64, treasury: f64) -> FundingLines {
        FundingLines {
            budget_calculation_type: BudgetCalculationType::WithTool,
            estimated_cost_with_tool: cost,
            estimated_cost_without_tool: 0.0,
            government_treasury: treasury,
            sdg_funding: 0.0,
            partners_funding: 0.0,
            other_funding: 0.0,
        }
    }

    #[test]
    fn activity_view_rolls_up_sub_activities() {
        let sub = SubActivity {
            id: "sac-1".into(),
            main_activity_id: "act-1".into(),
            name: "Workshop".into(),
            activity_type: ActivityType::Workshop,
            description: None,
            funding: lines(100.0, 80.0),
            details: CostDetails::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let view = ActivityView::new(
            activity(20.0),
            Some("Org A".into()),
            FundingSource::SubActivityList(vec![sub]),
        );
        assert_eq!(view.sub_activities.len(), 1);
        assert!(view.legacy_budget.is_none());
        assert!((view.total_budget - 100.0).abs() < f64::EPSILON);
        assert!((view.funding_gap - 20.0).abs() < f64::EPSILON);
        assert!((view.quarterly_sum - 10.0).abs() < f64::EPSILON);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["funding_gap"], serde_json::json!(20.0));
        assert_eq!(json["sub_activities"][0]["funding_gap"], serde_json::json!(20.0));
        assert_eq!(json["name"], serde_json::json!("Train staff"));
    }

    #[test]
    fn initiative_view_totals_match_listed_children() {
        let initiative = StrategicInitiative {
            id: "ini-1".into(),
            name: "Expand care".into(),
            weight: 40.0,
            parent: InitiativeParent::Objective("obj-1".into()),
            organization_id: Some("org-a".into()),
            is_default: false,
            initiative_feed_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let activities = vec![
            ActivityView::new(activity(10.0), None, FundingSource::select(vec![], None)),
            ActivityView::new(activity(6.0), None, FundingSource::select(vec![], None)),
        ];
        let view = InitiativeView::new(initiative, None, None, vec![], activities);
        assert!((view.total_activities_weight - 16.0).abs() < f64::EPSILON);
        assert!(view.total_measures_weight.abs() < f64::EPSILON);
    }

    #[test]
    fn review_view_names_evaluator_or_system() {
        let review = PlanReview {
            id: "rev-1".into(),
            plan_id: "pln-1".into(),
            evaluator_id: Some("mbr-1".into()),
            status: ReviewStatus::Approved,
            feedback: None,
            reviewed_at: Utc::now(),
        };
        let evaluator = OrganizationUser {
            id: "mbr-1".into(),
            user_id: "u-1".into(),
            username: "abebe".into(),
            first_name: String::new(),
            last_name: String::new(),
            organization_id: "org-a".into(),
            role: OrgRole::Evaluator,
            created_at: Utc::now(),
        };
        assert_eq!(PlanReviewView::new(review.clone(), Some(&evaluator)).evaluator_name, "abebe");
        assert_eq!(PlanReviewView::new(review, None).evaluator_name, SYSTEM_EVALUATOR);
    }

    #[test]
    fn procurement_view_carries_labels() {
        let view = ProcurementItemView::from(ProcurementItem {
            id: "pri-1".into(),
            category: crate::enums::ProcurementCategory::ItEquipment,
            name: "Laptop".into(),
            unit: crate::enums::ProcurementUnit::Piece,
            unit_price: 900.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        assert_eq!(view.category_label, "IT Equipment");
        assert_eq!(view.unit_label, "Piece");
    }
}
