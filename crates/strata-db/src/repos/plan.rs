//! Plan repository: transactional create/update, submission, assembled view.
//!
//! A plan's selected objectives and weight overrides live in two association
//! tables. Every write touching them runs in one transaction together with the
//! plan row, so a failure leaves no partial selection behind.

use std::collections::BTreeMap;

use chrono::Utc;

use strata_core::drafts::NewPlan;
use strata_core::entities::Plan;
use strata_core::enums::PlanStatus;
use strata_core::ids::PREFIX_PLAN;
use strata_core::responses::PlanView;
use strata_core::rules::plan::{check_transition, plan_objective_view, validate_plan_draft};
use strata_core::rules::visibility::filter_visible;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_date, parse_datetime, parse_enum, parse_optional_datetime};
use crate::service::{StrataService, ensure_valid, roll_back};
use crate::updates::plan::PlanUpdate;

const SELECT_COLS: &str = "id, organization_id, planner_name, plan_type, executive_name, \
                           strategic_objective_id, program_id, fiscal_year, from_date, to_date, \
                           status, submitted_at, created_at, updated_at";

fn row_to_plan(row: &libsql::Row) -> Result<Plan, DatabaseError> {
    Ok(Plan {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        planner_name: row.get(2)?,
        plan_type: row.get(3)?,
        executive_name: get_opt_string(row, 4)?,
        strategic_objective_id: get_opt_string(row, 5)?,
        program_id: get_opt_string(row, 6)?,
        fiscal_year: row.get(7)?,
        from_date: parse_date(&row.get::<String>(8)?)?,
        to_date: parse_date(&row.get::<String>(9)?)?,
        status: parse_enum(&row.get::<String>(10)?)?,
        submitted_at: parse_optional_datetime(get_opt_string(row, 11)?.as_deref())?,
        selected_objectives: Vec::new(),
        selected_objectives_weights: BTreeMap::new(),
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

/// The editable fields of a stored plan, for re-running draft validation.
fn as_draft(plan: &Plan) -> NewPlan {
    NewPlan {
        organization_id: plan.organization_id.clone(),
        planner_name: plan.planner_name.clone(),
        plan_type: plan.plan_type.clone(),
        executive_name: plan.executive_name.clone(),
        strategic_objective_id: plan.strategic_objective_id.clone(),
        program_id: plan.program_id.clone(),
        fiscal_year: plan.fiscal_year.clone(),
        from_date: plan.from_date,
        to_date: plan.to_date,
        selected_objectives: plan.selected_objectives.clone(),
        selected_objectives_weights: plan.selected_objectives_weights.clone(),
    }
}

/// Replace the selection and override rows of `plan`.
async fn write_selection(conn: &libsql::Connection, plan: &Plan) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM plan_objectives WHERE plan_id = ?1", [plan.id.as_str()])
        .await?;
    conn.execute("DELETE FROM plan_objective_weights WHERE plan_id = ?1", [plan.id.as_str()])
        .await?;

    for (position, objective_id) in plan.selected_objectives.iter().enumerate() {
        conn.execute(
            "INSERT INTO plan_objectives (plan_id, objective_id, position) VALUES (?1, ?2, ?3)",
            libsql::params![
                plan.id.as_str(),
                objective_id.as_str(),
                i64::try_from(position).unwrap_or(i64::MAX)
            ],
        ).await?;
    }
    for (objective_id, weight) in &plan.selected_objectives_weights {
        conn.execute(
            "INSERT INTO plan_objective_weights (plan_id, objective_id, weight) VALUES (?1, ?2, ?3)",
            libsql::params![plan.id.as_str(), objective_id.as_str(), *weight],
        ).await?;
    }
    Ok(())
}

async fn insert_plan(conn: &libsql::Connection, plan: &Plan) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO plans ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ),
        libsql::params![
            plan.id.as_str(),
            plan.organization_id.as_str(),
            plan.planner_name.as_str(),
            plan.plan_type.as_str(),
            plan.executive_name.as_deref(),
            plan.strategic_objective_id.as_deref(),
            plan.program_id.as_deref(),
            plan.fiscal_year.as_str(),
            plan.from_date.to_string(),
            plan.to_date.to_string(),
            plan.status.as_str(),
            plan.submitted_at.map(|t| t.to_rfc3339()),
            plan.created_at.to_rfc3339(),
            plan.updated_at.to_rfc3339()
        ],
    ).await?;
    write_selection(conn, plan).await
}

async fn update_plan_row(conn: &libsql::Connection, plan: &Plan, selection: bool) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE plans SET planner_name = ?1, plan_type = ?2, executive_name = ?3, fiscal_year = ?4, \
         from_date = ?5, to_date = ?6, updated_at = ?7 WHERE id = ?8",
        libsql::params![
            plan.planner_name.as_str(),
            plan.plan_type.as_str(),
            plan.executive_name.as_deref(),
            plan.fiscal_year.as_str(),
            plan.from_date.to_string(),
            plan.to_date.to_string(),
            plan.updated_at.to_rfc3339(),
            plan.id.as_str()
        ],
    ).await?;
    if selection {
        write_selection(conn, plan).await?;
    }
    Ok(())
}

impl StrataService {
    async fn validate_plan(&self, draft: &NewPlan) -> Result<(), DatabaseError> {
        let known = self.existing_objective_ids(&draft.selected_objectives).await?;
        let known: Vec<&str> = known.iter().map(String::as_str).collect();
        ensure_valid("plan", validate_plan_draft(draft, &known))
    }

    /// Create a draft plan with its objective selection in one transaction.
    pub async fn create_plan(&self, draft: NewPlan) -> Result<Plan, DatabaseError> {
        self.validate_plan(&draft).await?;
        self.get_organization(&draft.organization_id).await?;

        let now = Utc::now();
        let plan = Plan {
            id: self.db().generate_id(PREFIX_PLAN).await?,
            organization_id: draft.organization_id,
            planner_name: draft.planner_name,
            plan_type: draft.plan_type,
            executive_name: draft.executive_name,
            strategic_objective_id: draft.strategic_objective_id,
            program_id: draft.program_id,
            fiscal_year: draft.fiscal_year,
            from_date: draft.from_date,
            to_date: draft.to_date,
            status: PlanStatus::Draft,
            submitted_at: None,
            selected_objectives: draft.selected_objectives,
            selected_objectives_weights: draft.selected_objectives_weights,
            created_at: now,
            updated_at: now,
        };

        let tx = self.db().conn().transaction().await?;
        if let Err(e) = insert_plan(&tx, &plan).await {
            tracing::warn!(plan_id = %plan.id, error = %e, "plan create rolled back");
            return Err(roll_back(tx, e).await);
        }
        tx.commit().await?;
        tracing::debug!(
            plan_id = %plan.id,
            organization_id = %plan.organization_id,
            objectives = plan.selected_objectives.len(),
            "created plan"
        );

        Ok(plan)
    }

    pub async fn get_plan(&self, id: &str) -> Result<Plan, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {SELECT_COLS} FROM plans WHERE id = ?1"),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("plan", id))?;
        let mut plan = row_to_plan(&row)?;
        self.load_selection(&mut plan).await?;
        Ok(plan)
    }

    async fn load_selection(&self, plan: &mut Plan) -> Result<(), DatabaseError> {
        let mut rows = self.db().conn().query(
            "SELECT objective_id FROM plan_objectives WHERE plan_id = ?1 ORDER BY position",
            [plan.id.as_str()],
        ).await?;
        while let Some(row) = rows.next().await? {
            plan.selected_objectives.push(row.get(0)?);
        }

        let mut rows = self.db().conn().query(
            "SELECT objective_id, weight FROM plan_objective_weights WHERE plan_id = ?1",
            [plan.id.as_str()],
        ).await?;
        while let Some(row) = rows.next().await? {
            plan.selected_objectives_weights
                .insert(row.get::<String>(0)?, row.get::<f64>(1)?);
        }
        Ok(())
    }

    /// Plans of one organization, newest first.
    pub async fn list_plans(&self, organization_id: &str) -> Result<Vec<Plan>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT {SELECT_COLS} FROM plans WHERE organization_id = ?1 \
                 ORDER BY created_at DESC, id LIMIT {}",
                self.default_limit()
            ),
            [organization_id],
        ).await?;

        let mut plans = Vec::new();
        while let Some(row) = rows.next().await? {
            plans.push(row_to_plan(&row)?);
        }
        for plan in &mut plans {
            self.load_selection(plan).await?;
        }
        Ok(plans)
    }

    /// Apply `update` and rewrite the plan (and its selection, when touched)
    /// in one transaction.
    pub async fn update_plan(&self, id: &str, update: PlanUpdate) -> Result<Plan, DatabaseError> {
        let mut plan = self.get_plan(id).await?;
        update.apply(&mut plan);
        self.validate_plan(&as_draft(&plan)).await?;

        plan.updated_at = Utc::now();
        let tx = self.db().conn().transaction().await?;
        if let Err(e) = update_plan_row(&tx, &plan, update.touches_selection()).await {
            tracing::warn!(plan_id = %id, error = %e, "plan update rolled back");
            return Err(roll_back(tx, e).await);
        }
        tx.commit().await?;
        tracing::debug!(plan_id = %id, "updated plan");

        Ok(plan)
    }

    /// Move a draft plan to `SUBMITTED`.
    pub async fn submit_plan(&self, id: &str) -> Result<Plan, DatabaseError> {
        let mut plan = self.get_plan(id).await?;
        check_transition(&plan, PlanStatus::Submitted)?;

        let now = Utc::now();
        self.db().conn().execute(
            "UPDATE plans SET status = ?1, submitted_at = ?2, updated_at = ?3 WHERE id = ?4",
            libsql::params![PlanStatus::Submitted.as_str(), now.to_rfc3339(), now.to_rfc3339(), id],
        ).await?;
        tracing::info!(plan_id = %id, from = %plan.status, to = %PlanStatus::Submitted, "plan status changed");

        plan.status = PlanStatus::Submitted;
        plan.submitted_at = Some(now);
        plan.updated_at = now;
        Ok(plan)
    }

    /// Plan with its selected objectives as seen by the plan's organization.
    pub async fn get_plan_view(&self, id: &str) -> Result<PlanView, DatabaseError> {
        let plan = self.get_plan(id).await?;
        let organization_name = self.organization_name(Some(plan.organization_id.as_str())).await?;

        let mut selected_objectives_data = Vec::new();
        for objective_id in plan.objective_ids() {
            let objective = self.get_objective(objective_id).await?;
            let programs = self
                .program_views(
                    self.list_programs_for_objective(objective_id).await?,
                    Some(plan.organization_id.as_str()),
                )
                .await?;
            let initiatives = filter_visible(
                self.initiatives_for_objective(objective_id).await?,
                Some(plan.organization_id.as_str()),
            );
            let initiatives = self
                .initiative_views(initiatives, Some(plan.organization_id.as_str()))
                .await?;
            selected_objectives_data.push(plan_objective_view(&plan, objective, programs, initiatives));
        }

        let reviews = self.list_reviews(&plan.id).await?;
        Ok(PlanView {
            plan,
            organization_name,
            selected_objectives_data,
            reviews,
        })
    }
}
