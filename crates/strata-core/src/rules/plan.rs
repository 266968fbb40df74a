//! Plan draft checks, review gating, and plan objective assembly.

use crate::drafts::NewPlan;
use crate::entities::{Plan, StrategicObjective};
use crate::enums::{OrgRole, PlanStatus};
use crate::errors::{AuthorizationFailure, CoreError};
use crate::responses::{InitiativeView, ObjectiveView, ProgramView};
use crate::rules::weight::check_weight_range;
use crate::validation::{RuleViolation, ValidationErrors};

/// A review may only be recorded by an evaluator, against a submitted plan.
///
/// The role is checked first.
///
/// # Errors
///
/// Returns `InvalidReviewerRole` or `PlanNotSubmitted`.
pub fn check_review(evaluator_role: OrgRole, plan_status: PlanStatus) -> Result<(), AuthorizationFailure> {
    if evaluator_role != OrgRole::Evaluator {
        return Err(AuthorizationFailure::InvalidReviewerRole { role: evaluator_role });
    }
    if plan_status != PlanStatus::Submitted {
        return Err(AuthorizationFailure::PlanNotSubmitted { status: plan_status });
    }
    Ok(())
}

/// A plan may only move along its status state machine.
///
/// # Errors
///
/// Returns `CoreError::InvalidTransition` naming both states.
pub fn check_transition(plan: &Plan, next: PlanStatus) -> Result<(), CoreError> {
    if plan.status.can_transition_to(next) {
        return Ok(());
    }
    Err(CoreError::InvalidTransition {
        entity_type: "plan".to_string(),
        id: plan.id.clone(),
        from: plan.status.to_string(),
        to: next.to_string(),
    })
}

/// Field checks on a plan draft that need no store lookups.
///
/// `known_objectives` are the selected ids the store resolved.
#[must_use]
pub fn validate_plan_draft(draft: &NewPlan, known_objectives: &[&str]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.planner_name.trim().is_empty() {
        errors.push(&RuleViolation::Blank { field: "planner_name" });
    }
    if draft.fiscal_year.trim().is_empty() {
        errors.push(&RuleViolation::Blank { field: "fiscal_year" });
    }
    if draft.from_date > draft.to_date {
        errors.push(&RuleViolation::InvalidDateRange);
    }

    for objective_id in &draft.selected_objectives {
        if !known_objectives.contains(&objective_id.as_str()) {
            errors.push(&RuleViolation::UnknownObjective(objective_id.clone()));
        }
    }

    for (objective_id, weight) in &draft.selected_objectives_weights {
        if !draft.selected_objectives.contains(objective_id) {
            errors.push(&RuleViolation::UnselectedObjectiveWeight(objective_id.clone()));
        }
        errors.check(check_weight_range("selected_objectives_weights", *weight));
    }

    errors
}

/// One selected objective as seen inside a plan.
///
/// `programs` and `initiatives` must already be filtered to the plan
/// organization's visibility; the effective weight honors the plan's override.
#[must_use]
pub fn plan_objective_view(
    plan: &Plan,
    objective: StrategicObjective,
    programs: Vec<ProgramView>,
    initiatives: Vec<InitiativeView>,
) -> ObjectiveView {
    let effective_weight = plan.weight_for(&objective);
    ObjectiveView::new(objective, effective_weight, programs, initiatives)
}
