//! Shared fixtures for strata-db unit tests.

pub(crate) mod helpers {
    use chrono::NaiveDate;
    use strata_core::drafts::{
        NewActivity, NewInitiative, NewMeasure, NewMembership, NewObjective, NewOrganization,
        NewPlan, NewProgram,
    };
    use strata_core::entities::{
        MainActivity, Organization, OrganizationUser, PerformanceMeasure, Plan,
        StrategicInitiative, StrategicObjective, Targets,
    };
    use strata_core::enums::{OrgRole, TargetType};
    use strata_core::identity::Requester;

    use crate::StrataDb;
    use crate::service::StrataService;

    /// In-memory service with no requester (sees global records only).
    pub async fn test_service() -> StrataService {
        let db = StrataDb::open_local(":memory:").await.unwrap();
        StrataService::from_db(db, None)
    }

    /// In-memory service acting for a user of `org_id`.
    pub async fn test_service_for(org_id: &str) -> StrataService {
        let db = StrataDb::open_local(":memory:").await.unwrap();
        StrataService::from_db(db, Some(Requester::in_organization("user-1", org_id)))
    }

    pub fn requester(org_id: &str) -> Option<Requester> {
        Some(Requester::in_organization("user-1", org_id))
    }

    pub async fn seed_org(svc: &StrataService, name: &str) -> Organization {
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
    }

    pub async fn seed_member(svc: &StrataService, org_id: &str, role: OrgRole) -> OrganizationUser {
        svc.create_membership(NewMembership {
            user_id: format!("user-{}", role.as_str().to_lowercase()),
            username: role.as_str().to_lowercase(),
            first_name: String::new(),
            last_name: String::new(),
            organization_id: org_id.into(),
            role,
        })
        .await
        .unwrap()
    }

    pub async fn seed_objective(svc: &StrataService, weight: f64) -> StrategicObjective {
        svc.create_objective(NewObjective {
            title: "Improve access".into(),
            description: None,
            weight,
            planner_weight: None,
            is_default: true,
        })
        .await
        .unwrap()
    }

    pub async fn seed_program(svc: &StrataService, objective_id: &str) -> strata_core::entities::Program {
        svc.create_program(NewProgram {
            name: "Primary care".into(),
            description: None,
            strategic_objective_id: objective_id.into(),
            is_default: true,
        })
        .await
        .unwrap()
    }

    pub fn initiative_draft(objective_id: &str, weight: f64, org: Option<&str>) -> NewInitiative {
        NewInitiative {
            name: "Expand clinics".into(),
            weight,
            strategic_objective_id: Some(objective_id.into()),
            program_id: None,
            organization_id: org.map(String::from),
            is_default: false,
            initiative_feed_id: None,
        }
    }

    pub async fn seed_initiative(
        svc: &StrataService,
        objective_id: &str,
        weight: f64,
        org: Option<&str>,
    ) -> StrategicInitiative {
        svc.create_initiative(initiative_draft(objective_id, weight, org))
            .await
            .unwrap()
    }

    /// Cumulative targets summing to 10, first quarter selected.
    pub fn cumulative_targets() -> Targets {
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

    pub fn measure_draft(initiative_id: &str, weight: f64, org: Option<&str>) -> NewMeasure {
        NewMeasure {
            initiative_id: initiative_id.into(),
            name: "Facilities upgraded".into(),
            weight,
            targets: cumulative_targets(),
            organization_id: org.map(String::from),
        }
    }

    pub fn activity_draft(initiative_id: &str, weight: f64, org: Option<&str>) -> NewActivity {
        NewActivity {
            initiative_id: initiative_id.into(),
            name: "Train staff".into(),
            weight,
            targets: cumulative_targets(),
            organization_id: org.map(String::from),
        }
    }

    pub async fn seed_measure(
        svc: &StrataService,
        initiative_id: &str,
        weight: f64,
        org: Option<&str>,
    ) -> PerformanceMeasure {
        svc.create_measure(measure_draft(initiative_id, weight, org))
            .await
            .unwrap()
    }

    pub async fn seed_activity(
        svc: &StrataService,
        initiative_id: &str,
        weight: f64,
        org: Option<&str>,
    ) -> MainActivity {
        svc.create_activity(activity_draft(initiative_id, weight, org))
            .await
            .unwrap()
    }

    pub fn plan_draft(org_id: &str, objectives: &[&str]) -> NewPlan {
        NewPlan {
            organization_id: org_id.into(),
            planner_name: "Hana".into(),
            plan_type: "LEO/EO Plan".into(),
            executive_name: None,
            strategic_objective_id: None,
            program_id: None,
            fiscal_year: "2026".into(),
            from_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
            selected_objectives: objectives.iter().map(|s| (*s).to_string()).collect(),
            selected_objectives_weights: std::collections::BTreeMap::new(),
        }
    }

    pub async fn seed_plan(svc: &StrataService, org_id: &str, objectives: &[&str]) -> Plan {
        svc.create_plan(plan_draft(org_id, objectives)).await.unwrap()
    }
}
