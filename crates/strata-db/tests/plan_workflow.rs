//! Integration tests for plan assembly and the review workflow.
//!
//! - Plan view: overrides, fallback weights, plan-org visibility, legacy objective
//! - Transactional plan writes
//! - Review gating (role before status) and status transitions

use std::collections::BTreeMap;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use strata_core::drafts::{
    NewActivity, NewInitiative, NewMembership, NewObjective, NewOrganization, NewPlan,
    NewPlanReview, NewProgram,
};
use strata_core::entities::Targets;
use strata_core::enums::{OrgRole, PlanStatus, ReviewStatus, TargetType};
use strata_core::errors::AuthorizationFailure;
use strata_core::responses::SYSTEM_EVALUATOR;
use strata_db::error::DatabaseError;
use strata_db::service::StrataService;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn test_service() -> StrataService {
    StrataService::new_local(":memory:", None).await.unwrap()
}

async fn org(svc: &StrataService, name: &str) -> String {
    svc.create_organization(NewOrganization {
        name: name.into(),
        org_type: None,
        parent_id: None,
        vision: None,
        mission: None,
        core_values: vec![],
    })
    .await
    .unwrap()
    .id
}

async fn member(svc: &StrataService, org_id: &str, role: OrgRole, first: &str, last: &str) -> String {
    svc.create_membership(NewMembership {
        user_id: format!("user-{first}"),
        username: first.to_lowercase(),
        first_name: first.into(),
        last_name: last.into(),
        organization_id: org_id.into(),
        role,
    })
    .await
    .unwrap()
    .id
}

async fn objective(svc: &StrataService, weight: f64, planner_weight: Option<f64>) -> String {
    svc.create_objective(NewObjective {
        title: "Primary health care".into(),
        description: None,
        weight,
        planner_weight,
        is_default: true,
    })
    .await
    .unwrap()
    .id
}

fn plan(org_id: &str, objectives: &[&str]) -> NewPlan {
    NewPlan {
        organization_id: org_id.into(),
        planner_name: "Selam".into(),
        plan_type: "LEO/EO Plan".into(),
        executive_name: Some("Dawit".into()),
        strategic_objective_id: None,
        program_id: None,
        fiscal_year: "2027".into(),
        from_date: NaiveDate::from_ymd_opt(2027, 7, 8).unwrap(),
        to_date: NaiveDate::from_ymd_opt(2028, 7, 7).unwrap(),
        selected_objectives: objectives.iter().map(|s| (*s).to_string()).collect(),
        selected_objectives_weights: BTreeMap::new(),
    }
}

fn verdict(evaluator_id: &str, status: ReviewStatus) -> NewPlanReview {
    NewPlanReview {
        evaluator_id: evaluator_id.into(),
        status,
        feedback: None,
        reviewed_at: None,
    }
}

// ---------------------------------------------------------------------------
// Plan assembly
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plan_view_uses_override_then_effective_weight() {
    let svc = test_service().await;
    let org_id = org(&svc, "Sidama RHB").await;
    let overridden = objective(&svc, 30.0, None).await;
    let fallback = objective(&svc, 40.0, Some(35.0)).await;

    let mut draft = plan(&org_id, &[&overridden, &fallback]);
    draft.selected_objectives_weights.insert(overridden.clone(), 18.0);
    let created = svc.create_plan(draft).await.unwrap();

    let view = svc.get_plan_view(&created.id).await.unwrap();
    assert_eq!(view.organization_name.as_deref(), Some("Sidama RHB"));
    let weights: Vec<f64> = view
        .selected_objectives_data
        .iter()
        .map(|o| o.effective_weight)
        .collect();
    assert_eq!(weights, vec![18.0, 35.0]);
}

#[tokio::test]
async fn plan_view_filters_by_plan_organization() {
    let svc = test_service().await;
    let org_a = org(&svc, "Tigray RHB").await;
    let org_b = org(&svc, "Afar RHB").await;
    let obj = objective(&svc, 50.0, None).await;

    let shared = svc
        .create_initiative(NewInitiative {
            name: "Shared".into(),
            weight: 20.0,
            strategic_objective_id: Some(obj.clone()),
            program_id: None,
            organization_id: None,
            is_default: true,
            initiative_feed_id: None,
        })
        .await
        .unwrap();
    svc.create_initiative(NewInitiative {
        name: "Only B".into(),
        weight: 10.0,
        strategic_objective_id: Some(obj.clone()),
        program_id: None,
        organization_id: Some(org_b.clone()),
        is_default: false,
        initiative_feed_id: None,
    })
    .await
    .unwrap();

    let targets = Targets {
        baseline: None,
        target_type: TargetType::Constant,
        q1_target: 4.0,
        q2_target: 4.0,
        q3_target: 4.0,
        q4_target: 4.0,
        annual_target: 4.0,
        selected_months: vec![],
        selected_quarters: vec!["Q3".into()],
    };
    for (org_id, weight) in [(&org_a, 6.0), (&org_b, 9.0)] {
        svc.create_activity(NewActivity {
            initiative_id: shared.id.clone(),
            name: "Quarterly review meeting".into(),
            weight,
            targets: targets.clone(),
            organization_id: Some(org_id.clone()),
        })
        .await
        .unwrap();
    }

    let plan_a = svc.create_plan(plan(&org_a, &[&obj])).await.unwrap();
    let view = svc.get_plan_view(&plan_a.id).await.unwrap();
    let objective_view = &view.selected_objectives_data[0];
    assert_eq!(objective_view.initiatives.len(), 1);
    assert!((objective_view.total_initiatives_weight - 20.0).abs() < f64::EPSILON);

    let activities = &objective_view.initiatives[0].main_activities;
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].activity.organization_id.as_deref(), Some(org_a.as_str()));

    assert_eq!(svc.get_plan_view(&plan_a.id).await.unwrap(), view);
}

#[tokio::test]
async fn plan_view_nests_program_initiatives() {
    let svc = test_service().await;
    let org_a = org(&svc, "Gambella RHB").await;
    let org_b = org(&svc, "Benishangul RHB").await;
    let obj = objective(&svc, 45.0, None).await;
    let program = svc
        .create_program(NewProgram {
            name: "Immunization".into(),
            description: None,
            strategic_objective_id: obj.clone(),
            is_default: false,
        })
        .await
        .unwrap();

    let owners = [
        ("Outreach campaigns", Some(org_a.clone())),
        ("Cold chain", Some(org_b.clone())),
        ("Vaccine supply", None),
    ];
    for (name, org_id) in owners {
        svc.create_initiative(NewInitiative {
            name: name.into(),
            weight: 12.0,
            strategic_objective_id: None,
            program_id: Some(program.id.clone()),
            organization_id: org_id,
            is_default: false,
            initiative_feed_id: None,
        })
        .await
        .unwrap();
    }

    let plan_a = svc.create_plan(plan(&org_a, &[&obj])).await.unwrap();
    let view = svc.get_plan_view(&plan_a.id).await.unwrap();
    let objective_view = &view.selected_objectives_data[0];
    assert!(objective_view.initiatives.is_empty());
    assert_eq!(objective_view.programs.len(), 1);

    let program_view = &objective_view.programs[0];
    assert_eq!(program_view.program.id, program.id);
    assert_eq!(program_view.strategic_objective_title.as_deref(), Some("Primary health care"));
    let mut names: Vec<&str> = program_view
        .initiatives
        .iter()
        .map(|i| i.initiative.name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Outreach campaigns", "Vaccine supply"]);
}

#[tokio::test]
async fn legacy_single_objective_is_assembled() {
    let svc = test_service().await;
    let org_id = org(&svc, "Harari RHB").await;
    let obj = objective(&svc, 22.0, None).await;

    let mut draft = plan(&org_id, &[]);
    draft.strategic_objective_id = Some(obj.clone());
    let created = svc.create_plan(draft).await.unwrap();

    let view = svc.get_plan_view(&created.id).await.unwrap();
    assert_eq!(view.selected_objectives_data.len(), 1);
    assert_eq!(view.selected_objectives_data[0].objective.id, obj);
    assert!((view.selected_objectives_data[0].effective_weight - 22.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn failed_plan_write_leaves_nothing_behind() {
    let svc = test_service().await;
    let org_id = org(&svc, "Gambela RHB").await;
    let obj = objective(&svc, 30.0, None).await;

    let err = svc.create_plan(plan(&org_id, &[&obj, &obj])).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Persistence(_)));
    assert!(svc.list_plans(&org_id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Review workflow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submitted_plan_approved_by_evaluator() {
    let svc = test_service().await;
    let org_id = org(&svc, "Somali RHB").await;
    let evaluator = member(&svc, &org_id, OrgRole::Evaluator, "Meron", "Tesfaye").await;
    let obj = objective(&svc, 30.0, None).await;
    let created = svc.create_plan(plan(&org_id, &[&obj])).await.unwrap();

    svc.submit_plan(&created.id).await.unwrap();
    svc.create_review(&created.id, verdict(&evaluator, ReviewStatus::Approved))
        .await
        .unwrap();

    let view = svc.get_plan_view(&created.id).await.unwrap();
    assert_eq!(view.plan.status, PlanStatus::Approved);
    assert_eq!(view.reviews.len(), 1);
    assert_eq!(view.reviews[0].evaluator_name, "Meron Tesfaye");

    // Terminal: a second review is refused on status.
    let err = svc
        .create_review(&created.id, verdict(&evaluator, ReviewStatus::Rejected))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::Authorization(AuthorizationFailure::PlanNotSubmitted { status: PlanStatus::Approved })
    ));
}

#[tokio::test]
async fn role_is_checked_before_status() {
    let svc = test_service().await;
    let org_id = org(&svc, "Amhara RHB").await;
    let admin = member(&svc, &org_id, OrgRole::Admin, "Abebe", "Kebede").await;
    let obj = objective(&svc, 30.0, None).await;
    let created = svc.create_plan(plan(&org_id, &[&obj])).await.unwrap();

    let err = svc
        .create_review(&created.id, verdict(&admin, ReviewStatus::Approved))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::Authorization(AuthorizationFailure::InvalidReviewerRole { role: OrgRole::Admin })
    ));
}

#[tokio::test]
async fn deleted_evaluator_shows_as_system() {
    let svc = test_service().await;
    let org_id = org(&svc, "Oromia RHB").await;
    let evaluator = member(&svc, &org_id, OrgRole::Evaluator, "Hana", "Girma").await;
    let obj = objective(&svc, 30.0, None).await;
    let created = svc.create_plan(plan(&org_id, &[&obj])).await.unwrap();
    svc.submit_plan(&created.id).await.unwrap();
    svc.create_review(&created.id, verdict(&evaluator, ReviewStatus::Rejected))
        .await
        .unwrap();

    svc.db()
        .conn()
        .execute("DELETE FROM memberships WHERE id = ?1", [evaluator.as_str()])
        .await
        .unwrap();

    let reviews = svc.list_reviews(&created.id).await.unwrap();
    assert_eq!(reviews[0].review.evaluator_id, None);
    assert_eq!(reviews[0].evaluator_name, SYSTEM_EVALUATOR);
}
