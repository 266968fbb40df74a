//! Sub-activity and legacy activity budget repository.
//!
//! An activity is funded either by its sub-activities or, when it has none,
//! by its single legacy budget row. [`StrataService::funding_source`] makes
//! that choice for every read.

use chrono::Utc;

use strata_core::drafts::{NewActivityBudget, NewSubActivity};
use strata_core::entities::{ActivityBudget, CostDetails, FundingLines, SubActivity};
use strata_core::ids::{PREFIX_BUDGET, PREFIX_SUB_ACTIVITY};
use strata_core::responses::SubActivityView;
use strata_core::rules::funding::{FundingSource, check_estimated_cost};
use strata_core::validation::{RuleViolation, ValidationErrors};

use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, parse_datetime, parse_enum, parse_optional_json, to_optional_json_text,
};
use crate::service::{StrataService, ensure_valid};
use crate::updates::sub_activity::SubActivityUpdate;

const FUNDING_COLS: &str = "budget_calculation_type, estimated_cost_with_tool, estimated_cost_without_tool, \
                            government_treasury, sdg_funding, partners_funding, other_funding, \
                            training_details, meeting_workshop_details, procurement_details, \
                            printing_details, supervision_details, partners_details";

fn sub_activity_cols() -> String {
    format!("id, main_activity_id, name, activity_type, description, {FUNDING_COLS}, created_at, updated_at")
}

fn budget_cols() -> String {
    format!("id, activity_id, sub_activity_label, activity_type, {FUNDING_COLS}, created_at, updated_at")
}

fn row_to_funding(row: &libsql::Row, start: i32) -> Result<FundingLines, DatabaseError> {
    Ok(FundingLines {
        budget_calculation_type: parse_enum(&row.get::<String>(start)?)?,
        estimated_cost_with_tool: row.get(start + 1)?,
        estimated_cost_without_tool: row.get(start + 2)?,
        government_treasury: row.get(start + 3)?,
        sdg_funding: row.get(start + 4)?,
        partners_funding: row.get(start + 5)?,
        other_funding: row.get(start + 6)?,
    })
}

fn row_to_details(row: &libsql::Row, start: i32) -> Result<CostDetails, DatabaseError> {
    let json = |offset: i32| -> Result<Option<serde_json::Value>, DatabaseError> {
        parse_optional_json(get_opt_string(row, start + offset)?.as_deref())
    };
    Ok(CostDetails {
        training_details: json(0)?,
        meeting_workshop_details: json(1)?,
        procurement_details: json(2)?,
        printing_details: json(3)?,
        supervision_details: json(4)?,
        partners_details: json(5)?,
    })
}

/// The six detail blobs as nullable JSON text, in column order.
fn details_texts(details: &CostDetails) -> Result<[Option<String>; 6], DatabaseError> {
    Ok([
        to_optional_json_text(details.training_details.as_ref())?,
        to_optional_json_text(details.meeting_workshop_details.as_ref())?,
        to_optional_json_text(details.procurement_details.as_ref())?,
        to_optional_json_text(details.printing_details.as_ref())?,
        to_optional_json_text(details.supervision_details.as_ref())?,
        to_optional_json_text(details.partners_details.as_ref())?,
    ])
}

fn row_to_sub_activity(row: &libsql::Row) -> Result<SubActivity, DatabaseError> {
    Ok(SubActivity {
        id: row.get(0)?,
        main_activity_id: row.get(1)?,
        name: row.get(2)?,
        activity_type: parse_enum(&row.get::<String>(3)?)?,
        description: get_opt_string(row, 4)?,
        funding: row_to_funding(row, 5)?,
        details: row_to_details(row, 12)?,
        created_at: parse_datetime(&row.get::<String>(18)?)?,
        updated_at: parse_datetime(&row.get::<String>(19)?)?,
    })
}

fn row_to_budget(row: &libsql::Row) -> Result<ActivityBudget, DatabaseError> {
    Ok(ActivityBudget {
        id: row.get(0)?,
        activity_id: row.get(1)?,
        sub_activity_label: get_opt_string(row, 2)?,
        activity_type: get_opt_string(row, 3)?
            .as_deref()
            .map(parse_enum)
            .transpose()?,
        funding: row_to_funding(row, 4)?,
        details: row_to_details(row, 11)?,
        created_at: parse_datetime(&row.get::<String>(17)?)?,
        updated_at: parse_datetime(&row.get::<String>(18)?)?,
    })
}

fn validate_sub_activity(name: &str, funding: &FundingLines) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if name.trim().is_empty() {
        errors.push(&RuleViolation::Blank { field: "name" });
    }
    errors.check(check_estimated_cost(funding));
    errors
}

impl StrataService {
    pub async fn create_sub_activity(
        &self,
        draft: NewSubActivity,
    ) -> Result<SubActivity, DatabaseError> {
        ensure_valid("sub-activity", validate_sub_activity(&draft.name, &draft.funding))?;
        self.get_activity(&draft.main_activity_id).await?;

        let now = Utc::now();
        let sub_activity = SubActivity {
            id: self.db().generate_id(PREFIX_SUB_ACTIVITY).await?,
            main_activity_id: draft.main_activity_id,
            name: draft.name,
            activity_type: draft.activity_type,
            description: draft.description,
            funding: draft.funding,
            details: draft.details,
            created_at: now,
            updated_at: now,
        };

        let f = &sub_activity.funding;
        let [training, meeting, procurement, printing, supervision, partners] =
            details_texts(&sub_activity.details)?;
        self.db().conn().execute(
            &format!(
                "INSERT INTO sub_activities ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
                 ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
                sub_activity_cols()
            ),
            libsql::params![
                sub_activity.id.as_str(),
                sub_activity.main_activity_id.as_str(),
                sub_activity.name.as_str(),
                sub_activity.activity_type.as_str(),
                sub_activity.description.as_deref(),
                f.budget_calculation_type.as_str(),
                f.estimated_cost_with_tool,
                f.estimated_cost_without_tool,
                f.government_treasury,
                f.sdg_funding,
                f.partners_funding,
                f.other_funding,
                training,
                meeting,
                procurement,
                printing,
                supervision,
                partners,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(
            sub_activity_id = %sub_activity.id,
            activity_id = %sub_activity.main_activity_id,
            estimated_cost = f.summary().estimated_cost,
            "created sub-activity"
        );

        Ok(sub_activity)
    }

    pub async fn get_sub_activity(&self, id: &str) -> Result<SubActivity, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {} FROM sub_activities WHERE id = ?1", sub_activity_cols()),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("sub-activity", id))?;
        row_to_sub_activity(&row)
    }

    /// Sub-activities of one main activity, oldest first.
    pub async fn list_sub_activities(
        &self,
        activity_id: &str,
    ) -> Result<Vec<SubActivity>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT {} FROM sub_activities WHERE main_activity_id = ?1 ORDER BY created_at, id",
                sub_activity_cols()
            ),
            [activity_id],
        ).await?;

        let mut subs = Vec::new();
        while let Some(row) = rows.next().await? {
            subs.push(row_to_sub_activity(&row)?);
        }
        Ok(subs)
    }

    pub async fn get_sub_activity_view(&self, id: &str) -> Result<SubActivityView, DatabaseError> {
        Ok(SubActivityView::from(self.get_sub_activity(id).await?))
    }

    pub async fn update_sub_activity(
        &self,
        id: &str,
        update: SubActivityUpdate,
    ) -> Result<SubActivity, DatabaseError> {
        let mut sub_activity = self.get_sub_activity(id).await?;
        update.apply(&mut sub_activity);
        ensure_valid(
            "sub-activity",
            validate_sub_activity(&sub_activity.name, &sub_activity.funding),
        )?;

        sub_activity.updated_at = Utc::now();
        let f = &sub_activity.funding;
        let [training, meeting, procurement, printing, supervision, partners] =
            details_texts(&sub_activity.details)?;
        self.db().conn().execute(
            "UPDATE sub_activities SET name = ?1, activity_type = ?2, description = ?3, \
             budget_calculation_type = ?4, estimated_cost_with_tool = ?5, estimated_cost_without_tool = ?6, \
             government_treasury = ?7, sdg_funding = ?8, partners_funding = ?9, other_funding = ?10, \
             training_details = ?11, meeting_workshop_details = ?12, procurement_details = ?13, \
             printing_details = ?14, supervision_details = ?15, partners_details = ?16, \
             updated_at = ?17 WHERE id = ?18",
            libsql::params![
                sub_activity.name.as_str(),
                sub_activity.activity_type.as_str(),
                sub_activity.description.as_deref(),
                f.budget_calculation_type.as_str(),
                f.estimated_cost_with_tool,
                f.estimated_cost_without_tool,
                f.government_treasury,
                f.sdg_funding,
                f.partners_funding,
                f.other_funding,
                training,
                meeting,
                procurement,
                printing,
                supervision,
                partners,
                sub_activity.updated_at.to_rfc3339(),
                id
            ],
        ).await?;
        tracing::debug!(sub_activity_id = %id, "updated sub-activity");

        Ok(sub_activity)
    }

    pub async fn delete_sub_activity(&self, id: &str) -> Result<(), DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM sub_activities WHERE id = ?1", [id])
            .await?;
        if affected == 0 {
            return Err(DatabaseError::not_found("sub-activity", id));
        }
        tracing::debug!(sub_activity_id = %id, "deleted sub-activity");
        Ok(())
    }

    /// Record the single legacy budget of an activity.
    pub async fn create_activity_budget(
        &self,
        draft: NewActivityBudget,
    ) -> Result<ActivityBudget, DatabaseError> {
        let mut errors = ValidationErrors::new();
        errors.check(check_estimated_cost(&draft.funding));
        ensure_valid("activity budget", errors)?;
        self.get_activity(&draft.activity_id).await?;

        let now = Utc::now();
        let budget = ActivityBudget {
            id: self.db().generate_id(PREFIX_BUDGET).await?,
            activity_id: draft.activity_id,
            sub_activity_label: draft.sub_activity_label,
            activity_type: draft.activity_type,
            funding: draft.funding,
            details: draft.details,
            created_at: now,
            updated_at: now,
        };

        let f = &budget.funding;
        let [training, meeting, procurement, printing, supervision, partners] =
            details_texts(&budget.details)?;
        self.db().conn().execute(
            &format!(
                "INSERT INTO activity_budgets ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
                 ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                budget_cols()
            ),
            libsql::params![
                budget.id.as_str(),
                budget.activity_id.as_str(),
                budget.sub_activity_label.as_deref(),
                budget.activity_type.map(|t| t.as_str()),
                f.budget_calculation_type.as_str(),
                f.estimated_cost_with_tool,
                f.estimated_cost_without_tool,
                f.government_treasury,
                f.sdg_funding,
                f.partners_funding,
                f.other_funding,
                training,
                meeting,
                procurement,
                printing,
                supervision,
                partners,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(budget_id = %budget.id, activity_id = %budget.activity_id, "created activity budget");

        Ok(budget)
    }

    /// The legacy budget of an activity, if it has one.
    pub async fn legacy_budget(
        &self,
        activity_id: &str,
    ) -> Result<Option<ActivityBudget>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {} FROM activity_budgets WHERE activity_id = ?1", budget_cols()),
            [activity_id],
        ).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_budget(&row)?)),
            None => Ok(None),
        }
    }

    /// Where an activity's funding is read from.
    pub async fn funding_source(&self, activity_id: &str) -> Result<FundingSource, DatabaseError> {
        let subs = self.list_sub_activities(activity_id).await?;
        let legacy = if subs.is_empty() {
            self.legacy_budget(activity_id).await?
        } else {
            None
        };
        Ok(FundingSource::select(subs, legacy))
    }
}
