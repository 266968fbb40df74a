//! Performance measure repository: target rules and the 35% allocation.

use chrono::Utc;

use strata_core::drafts::NewMeasure;
use strata_core::entities::PerformanceMeasure;
use strata_core::ids::PREFIX_MEASURE;
use strata_core::responses::MeasureView;
use strata_core::rules::targets::{TargetOwner, validate_targets};
use strata_core::rules::visibility::{Scoped, filter_visible};
use strata_core::rules::weight::{ChildKind, check_scoped_allocation, check_weight_range};
use strata_core::validation::{RuleViolation, ValidationErrors};

use super::targets::{TARGET_COLS, period_texts, row_to_targets};
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::{StrataService, ensure_valid};
use crate::updates::measure::MeasureUpdate;

fn select_cols() -> String {
    format!("id, initiative_id, name, weight, {TARGET_COLS}, organization_id, created_at, updated_at")
}

fn row_to_measure(row: &libsql::Row) -> Result<PerformanceMeasure, DatabaseError> {
    Ok(PerformanceMeasure {
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
    /// Every rule a measure must pass under its initiative.
    ///
    /// Siblings are every other measure of the initiative. The allocation is
    /// checked in each scope the measure renders under, so a global measure
    /// must fit the fullest organization's budget.
    async fn validate_measure(
        &self,
        measure: &PerformanceMeasure,
        initiative_weight: f64,
    ) -> Result<ValidationErrors, DatabaseError> {
        let mut errors = ValidationErrors::new();
        if measure.name.trim().is_empty() {
            errors.push(&RuleViolation::Blank { field: "name" });
        }
        errors.check(check_weight_range("weight", measure.weight));
        errors.extend(validate_targets(&measure.targets, TargetOwner::Measure));

        let siblings: Vec<_> = self
            .measures_for_initiative(&measure.initiative_id)
            .await?
            .into_iter()
            .filter(|s| s.id != measure.id)
            .collect();
        errors.check(check_scoped_allocation(
            ChildKind::Measure,
            initiative_weight,
            &siblings,
            Some((&measure.scope(), measure.weight)),
        ));
        Ok(errors)
    }

    /// Create a measure. Without an explicit owner it belongs to the
    /// requester's organization.
    pub async fn create_measure(
        &self,
        draft: NewMeasure,
    ) -> Result<PerformanceMeasure, DatabaseError> {
        let initiative = self.get_initiative(&draft.initiative_id).await?;
        let organization_id = draft
            .organization_id
            .or_else(|| self.requester_org().map(String::from));

        let now = Utc::now();
        let measure = PerformanceMeasure {
            id: self.db().generate_id(PREFIX_MEASURE).await?,
            initiative_id: draft.initiative_id,
            name: draft.name,
            weight: draft.weight,
            targets: draft.targets,
            organization_id,
            created_at: now,
            updated_at: now,
        };
        let errors = self.validate_measure(&measure, initiative.weight).await?;
        ensure_valid("performance measure", errors)?;

        let (months, quarters) = period_texts(&measure.targets)?;
        let t = &measure.targets;
        self.db().conn().execute(
            &format!(
                "INSERT INTO measures ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                select_cols()
            ),
            libsql::params![
                measure.id.as_str(),
                measure.initiative_id.as_str(),
                measure.name.as_str(),
                measure.weight,
                t.baseline.as_deref(),
                t.target_type.as_str(),
                t.q1_target,
                t.q2_target,
                t.q3_target,
                t.q4_target,
                t.annual_target,
                months,
                quarters,
                measure.organization_id.as_deref(),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(measure_id = %measure.id, initiative_id = %measure.initiative_id, "created performance measure");

        Ok(measure)
    }

    pub async fn get_measure(&self, id: &str) -> Result<PerformanceMeasure, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {} FROM measures WHERE id = ?1", select_cols()),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("performance measure", id))?;
        row_to_measure(&row)
    }

    /// Every measure of an initiative, unfiltered.
    pub(crate) async fn measures_for_initiative(
        &self,
        initiative_id: &str,
    ) -> Result<Vec<PerformanceMeasure>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT {} FROM measures WHERE initiative_id = ?1 ORDER BY created_at, id",
                select_cols()
            ),
            [initiative_id],
        ).await?;

        let mut measures = Vec::new();
        while let Some(row) = rows.next().await? {
            measures.push(row_to_measure(&row)?);
        }
        Ok(measures)
    }

    /// Measures of an initiative that the requester may see.
    pub async fn list_measures(
        &self,
        initiative_id: &str,
    ) -> Result<Vec<PerformanceMeasure>, DatabaseError> {
        Ok(filter_visible(
            self.measures_for_initiative(initiative_id).await?,
            self.requester_org(),
        ))
    }

    pub async fn update_measure(
        &self,
        id: &str,
        update: MeasureUpdate,
    ) -> Result<PerformanceMeasure, DatabaseError> {
        let mut measure = self.get_measure(id).await?;
        update.apply(&mut measure);
        let initiative = self.get_initiative(&measure.initiative_id).await?;
        let errors = self.validate_measure(&measure, initiative.weight).await?;
        ensure_valid("performance measure", errors)?;

        measure.updated_at = Utc::now();
        let (months, quarters) = period_texts(&measure.targets)?;
        let t = &measure.targets;
        self.db().conn().execute(
            "UPDATE measures SET name = ?1, weight = ?2, baseline = ?3, target_type = ?4, \
             q1_target = ?5, q2_target = ?6, q3_target = ?7, q4_target = ?8, annual_target = ?9, \
             selected_months = ?10, selected_quarters = ?11, updated_at = ?12 WHERE id = ?13",
            libsql::params![
                measure.name.as_str(),
                measure.weight,
                t.baseline.as_deref(),
                t.target_type.as_str(),
                t.q1_target,
                t.q2_target,
                t.q3_target,
                t.q4_target,
                t.annual_target,
                months,
                quarters,
                measure.updated_at.to_rfc3339(),
                id
            ],
        ).await?;
        tracing::debug!(measure_id = %id, "updated performance measure");

        Ok(measure)
    }

    pub async fn delete_measure(&self, id: &str) -> Result<(), DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM measures WHERE id = ?1", [id])
            .await?;
        if affected == 0 {
            return Err(DatabaseError::not_found("performance measure", id));
        }
        tracing::debug!(measure_id = %id, "deleted performance measure");
        Ok(())
    }

    pub(crate) async fn measure_views(
        &self,
        measures: Vec<PerformanceMeasure>,
    ) -> Result<Vec<MeasureView>, DatabaseError> {
        let mut views = Vec::with_capacity(measures.len());
        for measure in measures {
            let organization_name = self
                .organization_name(measure.organization_id.as_deref())
                .await?;
            views.push(MeasureView::new(measure, organization_name));
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{
        cumulative_targets, measure_draft, requester, seed_initiative, seed_measure,
        seed_objective, seed_org, test_service,
    };
    use crate::updates::measure::MeasureUpdateBuilder;
    use strata_core::enums::TargetType;

    #[tokio::test]
    async fn measures_share_35_percent() {
        let svc = test_service().await;
        let objective = seed_objective(&svc, 40.0).await;
        let initiative = seed_initiative(&svc, &objective.id, 20.0, None).await;

        seed_measure(&svc, &initiative.id, 4.0, None).await;
        seed_measure(&svc, &initiative.id, 3.0, None).await;

        let err = svc
            .create_measure(measure_draft(&initiative.id, 0.5, None))
            .await
            .unwrap_err();
        let message = &err.validation_errors().unwrap().get("weight").unwrap()[0];
        assert!(message.contains("Remaining weight: 0"), "{message}");
    }

    #[tokio::test]
    async fn measure_defaults_to_requester_org() {
        let mut svc = test_service().await;
        let org = seed_org(&svc, "Amhara RHB").await;
        let objective = seed_objective(&svc, 40.0).await;
        let initiative = seed_initiative(&svc, &objective.id, 20.0, None).await;

        svc.set_requester(requester(&org.id));
        let measure = seed_measure(&svc, &initiative.id, 2.0, None).await;
        assert_eq!(measure.organization_id.as_deref(), Some(org.id.as_str()));
    }

    #[tokio::test]
    async fn measure_annual_target_may_be_zero() {
        let svc = test_service().await;
        let objective = seed_objective(&svc, 40.0).await;
        let initiative = seed_initiative(&svc, &objective.id, 20.0, None).await;

        let mut draft = measure_draft(&initiative.id, 2.0, None);
        draft.targets.q1_target = 0.0;
        draft.targets.q2_target = 0.0;
        draft.targets.q3_target = 0.0;
        draft.targets.q4_target = 0.0;
        draft.targets.annual_target = 0.0;
        assert!(svc.create_measure(draft).await.is_ok());
    }

    #[tokio::test]
    async fn target_failures_are_collected() {
        let svc = test_service().await;
        let objective = seed_objective(&svc, 40.0).await;
        let initiative = seed_initiative(&svc, &objective.id, 20.0, None).await;

        let mut draft = measure_draft(&initiative.id, 2.0, None);
        draft.targets.selected_quarters.clear();
        draft.targets.q2_target = -1.0;
        let errors = svc.create_measure(draft).await.unwrap_err();
        let errors = errors.validation_errors().unwrap();
        assert!(errors.contains_field("non_field_errors"));
        assert!(errors.contains_field("q2_target"));
    }

    #[tokio::test]
    async fn update_excludes_itself_from_siblings() {
        let svc = test_service().await;
        let objective = seed_objective(&svc, 40.0).await;
        let initiative = seed_initiative(&svc, &objective.id, 20.0, None).await;
        let measure = seed_measure(&svc, &initiative.id, 7.0, None).await;

        let updated = svc
            .update_measure(&measure.id, MeasureUpdateBuilder::new().weight(7.0).build())
            .await
            .unwrap();
        assert!((updated.weight - 7.0).abs() < f64::EPSILON);

        let mut targets = cumulative_targets();
        targets.target_type = TargetType::Constant;
        assert!(
            svc.update_measure(&measure.id, MeasureUpdateBuilder::new().targets(targets).build())
                .await
                .is_err()
        );
        assert_eq!(svc.get_measure(&measure.id).await.unwrap().targets, cumulative_targets());
    }

    #[tokio::test]
    async fn delete_measure_frees_allocation() {
        let svc = test_service().await;
        let objective = seed_objective(&svc, 40.0).await;
        let initiative = seed_initiative(&svc, &objective.id, 20.0, None).await;
        let measure = seed_measure(&svc, &initiative.id, 7.0, None).await;

        svc.delete_measure(&measure.id).await.unwrap();
        assert!(svc.create_measure(measure_draft(&initiative.id, 7.0, None)).await.is_ok());
        assert!(svc.delete_measure(&measure.id).await.unwrap_err().is_not_found());
    }
}
