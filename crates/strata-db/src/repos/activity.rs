//! Main activity repository: target rules, the 65% allocation, funded views.

use chrono::Utc;

use strata_core::drafts::NewActivity;
use strata_core::entities::MainActivity;
use strata_core::ids::PREFIX_ACTIVITY;
use strata_core::responses::ActivityView;
use strata_core::rules::targets::{TargetOwner, validate_targets};
use strata_core::rules::visibility::{Scoped, filter_visible};
use strata_core::rules::weight::{ChildKind, check_scoped_allocation, check_weight_range};
use strata_core::validation::{RuleViolation, ValidationErrors};

use super::targets::{TARGET_COLS, period_texts, row_to_targets};
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::{StrataService, ensure_valid};
use crate::updates::activity::ActivityUpdate;

fn select_cols() -> String {
    format!("id, initiative_id, name, weight, {TARGET_COLS}, organization_id, created_at, updated_at")
}

fn row_to_activity(row: &libsql::Row) -> Result<MainActivity, DatabaseError> {
    Ok(MainActivity {
        id: row.get(0)?,
        initiative_id: row.get(1)?,
        name: row.get(2)?,
        weight: row.get(3)?,
        targets: row_to_targets(row, 4)?,
        organization_id: get_opt_string(row, 13)?,
        created_at: parse_datetime(&row.get::<String>(14)?)?,
        updated_at: parse_datetime(&row.get::<String>(15)?)?,
    })
}

impl StrataService {
    /// Every rule an activity must pass under its initiative.
    ///
    /// Siblings are every other activity of the initiative. The allocation is
    /// checked in each scope the activity renders under, so a global activity
    /// must fit the fullest organization's budget.
    async fn validate_activity(
        &self,
        activity: &MainActivity,
        initiative_weight: f64,
    ) -> Result<ValidationErrors, DatabaseError> {
        let mut errors = ValidationErrors::new();
        if activity.name.trim().is_empty() {
            errors.push(&RuleViolation::Blank { field: "name" });
        }
        errors.check(check_weight_range("weight", activity.weight));
        errors.extend(validate_targets(&activity.targets, TargetOwner::Activity));

        let siblings: Vec<_> = self
            .activities_for_initiative(&activity.initiative_id)
            .await?
            .into_iter()
            .filter(|s| s.id != activity.id)
            .collect();
        errors.check(check_scoped_allocation(
            ChildKind::Activity,
            initiative_weight,
            &siblings,
            Some((&activity.scope(), activity.weight)),
        ));
        Ok(errors)
    }

    /// Create an activity. Without an explicit owner it belongs to the
    /// requester's organization.
    pub async fn create_activity(
        &self,
        draft: NewActivity,
    ) -> Result<MainActivity, DatabaseError> {
        let initiative = self.get_initiative(&draft.initiative_id).await?;
        let organization_id = draft
            .organization_id
            .or_else(|| self.requester_org().map(String::from));

        let now = Utc::now();
        let activity = MainActivity {
            id: self.db().generate_id(PREFIX_ACTIVITY).await?,
            initiative_id: draft.initiative_id,
            name: draft.name,
            weight: draft.weight,
            targets: draft.targets,
            organization_id,
            created_at: now,
            updated_at: now,
        };
        let errors = self.validate_activity(&activity, initiative.weight).await?;
        ensure_valid("main activity", errors)?;

        let (months, quarters) = period_texts(&activity.targets)?;
        let t = &activity.targets;
        self.db().conn().execute(
            &format!(
                "INSERT INTO activities ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                select_cols()
            ),
            libsql::params![
                activity.id.as_str(),
                activity.initiative_id.as_str(),
                activity.name.as_str(),
                activity.weight,
                t.baseline.as_deref(),
                t.target_type.as_str(),
                t.q1_target,
                t.q2_target,
                t.q3_target,
                t.q4_target,
                t.annual_target,
                months,
                quarters,
                activity.organization_id.as_deref(),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(activity_id = %activity.id, initiative_id = %activity.initiative_id, "created main activity");

        Ok(activity)
    }

    pub async fn get_activity(&self, id: &str) -> Result<MainActivity, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {} FROM activities WHERE id = ?1", select_cols()),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("main activity", id))?;
        row_to_activity(&row)
    }

    /// Every activity of an initiative, unfiltered.
    pub(crate) async fn activities_for_initiative(
        &self,
        initiative_id: &str,
    ) -> Result<Vec<MainActivity>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT {} FROM activities WHERE initiative_id = ?1 ORDER BY created_at, id",
                select_cols()
            ),
            [initiative_id],
        ).await?;

        let mut activities = Vec::new();
        while let Some(row) = rows.next().await? {
            activities.push(row_to_activity(&row)?);
        }
        Ok(activities)
    }

    /// Activities of an initiative that the requester may see.
    pub async fn list_activities(
        &self,
        initiative_id: &str,
    ) -> Result<Vec<MainActivity>, DatabaseError> {
        Ok(filter_visible(
            self.activities_for_initiative(initiative_id).await?,
            self.requester_org(),
        ))
    }

    pub async fn update_activity(
        &self,
        id: &str,
        update: ActivityUpdate,
    ) -> Result<MainActivity, DatabaseError> {
        let mut activity = self.get_activity(id).await?;
        update.apply(&mut activity);
        let initiative = self.get_initiative(&activity.initiative_id).await?;
        let errors = self.validate_activity(&activity, initiative.weight).await?;
        ensure_valid("main activity", errors)?;

        activity.updated_at = Utc::now();
        let (months, quarters) = period_texts(&activity.targets)?;
        let t = &activity.targets;
        self.db().conn().execute(
            "UPDATE activities SET name = ?1, weight = ?2, baseline = ?3, target_type = ?4, \
             q1_target = ?5, q2_target = ?6, q3_target = ?7, q4_target = ?8, annual_target = ?9, \
             selected_months = ?10, selected_quarters = ?11, updated_at = ?12 WHERE id = ?13",
            libsql::params![
                activity.name.as_str(),
                activity.weight,
                t.baseline.as_deref(),
                t.target_type.as_str(),
                t.q1_target,
                t.q2_target,
                t.q3_target,
                t.q4_target,
                t.annual_target,
                months,
                quarters,
                activity.updated_at.to_rfc3339(),
                id
            ],
        ).await?;
        tracing::debug!(activity_id = %id, "updated main activity");

        Ok(activity)
    }

    pub async fn delete_activity(&self, id: &str) -> Result<(), DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM activities WHERE id = ?1", [id])
            .await?;
        if affected == 0 {
            return Err(DatabaseError::not_found("main activity", id));
        }
        tracing::debug!(activity_id = %id, "deleted main activity");
        Ok(())
    }

    pub(crate) async fn activity_views(
        &self,
        activities: Vec<MainActivity>,
    ) -> Result<Vec<ActivityView>, DatabaseError> {
        let mut views = Vec::with_capacity(activities.len());
        for activity in activities {
            let organization_name = self
                .organization_name(activity.organization_id.as_deref())
                .await?;
            let source = self.funding_source(&activity.id).await?;
            views.push(ActivityView::new(activity, organization_name, source));
        }
        Ok(views)
    }

    /// Activity with its organization name, sub-activities and derived funding.
    pub async fn get_activity_view(&self, id: &str) -> Result<ActivityView, DatabaseError> {
        let activity = self.get_activity(id).await?;
        let mut views = self.activity_views(vec![activity]).await?;
        views
            .pop()
            .ok_or_else(|| DatabaseError::not_found("main activity", id))
    }
}
