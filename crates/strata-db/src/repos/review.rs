//! Plan review repository.
//!
//! Recording a review is the only way a plan leaves `SUBMITTED`. The review
//! row and the plan status change are written in one transaction.

use chrono::Utc;

use strata_core::drafts::NewPlanReview;
use strata_core::entities::PlanReview;
use strata_core::ids::PREFIX_REVIEW;
use strata_core::responses::PlanReviewView;
use strata_core::rules::plan::check_review;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::{StrataService, roll_back};

const SELECT_COLS: &str = "id, plan_id, evaluator_id, status, feedback, reviewed_at";

fn row_to_review(row: &libsql::Row) -> Result<PlanReview, DatabaseError> {
    Ok(PlanReview {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        evaluator_id: get_opt_string(row, 2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        feedback: get_opt_string(row, 4)?,
        reviewed_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

async fn write_review(conn: &libsql::Connection, review: &PlanReview) -> Result<(), DatabaseError> {
    conn.execute(
        &format!("INSERT INTO plan_reviews ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
        libsql::params![
            review.id.as_str(),
            review.plan_id.as_str(),
            review.evaluator_id.as_deref(),
            review.status.as_str(),
            review.feedback.as_deref(),
            review.reviewed_at.to_rfc3339()
        ],
    ).await?;
    conn.execute(
        "UPDATE plans SET status = ?1, updated_at = ?2 WHERE id = ?3",
        libsql::params![
            review.status.plan_status().as_str(),
            Utc::now().to_rfc3339(),
            review.plan_id.as_str()
        ],
    ).await?;
    Ok(())
}

impl StrataService {
    /// Record an evaluator's verdict and move the plan to the matching status.
    ///
    /// The evaluator's role is checked before the plan's status.
    pub async fn create_review(
        &self,
        plan_id: &str,
        draft: NewPlanReview,
    ) -> Result<PlanReview, DatabaseError> {
        let evaluator = self.get_membership(&draft.evaluator_id).await?;
        let plan = self.get_plan(plan_id).await?;
        if let Err(failure) = check_review(evaluator.role, plan.status) {
            tracing::warn!(plan_id, evaluator_id = %evaluator.id, %failure, "review refused");
            return Err(failure.into());
        }

        let review = PlanReview {
            id: self.db().generate_id(PREFIX_REVIEW).await?,
            plan_id: plan.id,
            evaluator_id: Some(evaluator.id),
            status: draft.status,
            feedback: draft.feedback,
            reviewed_at: draft.reviewed_at.unwrap_or_else(Utc::now),
        };

        let tx = self.db().conn().transaction().await?;
        if let Err(e) = write_review(&tx, &review).await {
            tracing::warn!(plan_id, error = %e, "review rolled back");
            return Err(roll_back(tx, e).await);
        }
        tx.commit().await?;
        tracing::info!(
            plan_id,
            review_id = %review.id,
            from = %plan.status,
            to = %review.status.plan_status(),
            "plan status changed"
        );

        Ok(review)
    }

    pub async fn get_review(&self, id: &str) -> Result<PlanReview, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {SELECT_COLS} FROM plan_reviews WHERE id = ?1"),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("plan review", id))?;
        row_to_review(&row)
    }

    /// Reviews of a plan, oldest first, with evaluator names resolved.
    pub async fn list_reviews(&self, plan_id: &str) -> Result<Vec<PlanReviewView>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {SELECT_COLS} FROM plan_reviews WHERE plan_id = ?1 ORDER BY reviewed_at, id"),
            [plan_id],
        ).await?;

        let mut reviews = Vec::new();
        while let Some(row) = rows.next().await? {
            reviews.push(row_to_review(&row)?);
        }

        let mut views = Vec::with_capacity(reviews.len());
        for review in reviews {
            let evaluator = match review.evaluator_id.as_deref() {
                Some(member_id) => match self.get_membership(member_id).await {
                    Ok(member) => Some(member),
                    Err(e) if e.is_not_found() => None,
                    Err(e) => return Err(e),
                },
                None => None,
            };
            views.push(PlanReviewView::new(review, evaluator.as_ref()));
        }
        Ok(views)
    }
}
