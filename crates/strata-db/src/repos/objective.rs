//! Strategic objective repository.

use chrono::Utc;

use strata_core::drafts::NewObjective;
use strata_core::entities::StrategicObjective;
use strata_core::ids::PREFIX_OBJECTIVE;
use strata_core::responses::ObjectiveView;
use strata_core::rules::visibility::filter_visible;
use strata_core::rules::weight::{check_initiative_weight, check_weight_range};
use strata_core::validation::ValidationErrors;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime};
use crate::service::{StrataService, ensure_valid};
use crate::updates::objective::ObjectiveUpdate;

const SELECT_COLS: &str =
    "id, title, description, weight, planner_weight, is_default, created_at, updated_at";

fn row_to_objective(row: &libsql::Row) -> Result<StrategicObjective, DatabaseError> {
    Ok(StrategicObjective {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        weight: row.get(3)?,
        planner_weight: row.get::<Option<f64>>(4)?,
        is_default: get_bool(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn validate_objective(objective: &StrategicObjective) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check(check_weight_range("weight", objective.weight));
    if let Some(planner_weight) = objective.planner_weight {
        errors.check(check_weight_range("planner_weight", planner_weight));
    }
    errors
}

impl StrataService {
    pub async fn create_objective(
        &self,
        draft: NewObjective,
    ) -> Result<StrategicObjective, DatabaseError> {
        let now = Utc::now();
        let objective = StrategicObjective {
            id: self.db().generate_id(PREFIX_OBJECTIVE).await?,
            title: draft.title,
            description: draft.description,
            weight: draft.weight,
            planner_weight: draft.planner_weight,
            is_default: draft.is_default,
            created_at: now,
            updated_at: now,
        };
        ensure_valid("objective", validate_objective(&objective))?;

        self.db().conn().execute(
            &format!("INSERT INTO objectives ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            libsql::params![
                objective.id.as_str(),
                objective.title.as_str(),
                objective.description.as_deref(),
                objective.weight,
                objective.planner_weight,
                i64::from(objective.is_default),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(objective_id = %objective.id, "created objective");

        Ok(objective)
    }

    pub async fn get_objective(&self, id: &str) -> Result<StrategicObjective, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {SELECT_COLS} FROM objectives WHERE id = ?1"),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("objective", id))?;
        row_to_objective(&row)
    }

    pub async fn list_objectives(&self) -> Result<Vec<StrategicObjective>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT {SELECT_COLS} FROM objectives ORDER BY created_at, id LIMIT {}",
                self.default_limit()
            ),
            (),
        ).await?;

        let mut objectives = Vec::new();
        while let Some(row) = rows.next().await? {
            objectives.push(row_to_objective(&row)?);
        }
        Ok(objectives)
    }

    /// Ids among `ids` that name an existing objective.
    pub(crate) async fn existing_objective_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<String>, DatabaseError> {
        let mut found = Vec::new();
        for id in ids {
            let mut rows = self
                .db()
                .conn()
                .query("SELECT id FROM objectives WHERE id = ?1", [id.as_str()])
                .await?;
            if rows.next().await?.is_some() {
                found.push(id.clone());
            }
        }
        Ok(found)
    }

    /// Largest weight among the initiatives under an objective, directly or
    /// through one of its programs.
    async fn heaviest_initiative_weight(
        &self,
        objective_id: &str,
    ) -> Result<Option<f64>, DatabaseError> {
        let mut initiatives = self.initiatives_for_objective(objective_id).await?;
        for program in self.list_programs_for_objective(objective_id).await? {
            initiatives.extend(self.initiatives_for_program(&program.id).await?);
        }
        Ok(initiatives.iter().map(|i| i.weight).reduce(f64::max))
    }

    pub async fn update_objective(
        &self,
        id: &str,
        update: ObjectiveUpdate,
    ) -> Result<StrategicObjective, DatabaseError> {
        let mut objective = self.get_objective(id).await?;
        update.apply(&mut objective);
        let mut errors = validate_objective(&objective);
        if let Some(heaviest) = self.heaviest_initiative_weight(id).await? {
            errors.check(check_initiative_weight(heaviest, objective.effective_weight()));
        }
        ensure_valid("objective", errors)?;

        objective.updated_at = Utc::now();
        self.db().conn().execute(
            "UPDATE objectives SET title = ?1, description = ?2, weight = ?3, planner_weight = ?4, \
             is_default = ?5, updated_at = ?6 WHERE id = ?7",
            libsql::params![
                objective.title.as_str(),
                objective.description.as_deref(),
                objective.weight,
                objective.planner_weight,
                i64::from(objective.is_default),
                objective.updated_at.to_rfc3339(),
                id
            ],
        ).await?;
        tracing::debug!(objective_id = %id, "updated objective");

        Ok(objective)
    }

    pub async fn delete_objective(&self, id: &str) -> Result<(), DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM objectives WHERE id = ?1", [id])
            .await?;
        if affected == 0 {
            return Err(DatabaseError::not_found("objective", id));
        }
        tracing::debug!(objective_id = %id, "deleted objective");
        Ok(())
    }

    /// Objective with its programs and the initiatives the requester may see.
    pub async fn get_objective_view(&self, id: &str) -> Result<ObjectiveView, DatabaseError> {
        let objective = self.get_objective(id).await?;
        let programs = self
            .program_views(self.list_programs_for_objective(id).await?, self.requester_org())
            .await?;
        let initiatives = filter_visible(
            self.initiatives_for_objective(id).await?,
            self.requester_org(),
        );
        let initiatives = self
            .initiative_views(initiatives, self.requester_org())
            .await?;

        let effective_weight = objective.effective_weight();
        Ok(ObjectiveView::new(objective, effective_weight, programs, initiatives))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{
        initiative_draft, seed_initiative, seed_objective, seed_org, seed_program, test_service,
    };
    use crate::updates::objective::ObjectiveUpdateBuilder;
    use strata_core::identity::Requester;

    #[tokio::test]
    async fn lowering_weight_below_initiatives_rejected() {
        let svc = test_service().await;
        let objective = seed_objective(&svc, 30.0).await;
        let program = seed_program(&svc, &objective.id).await;
        seed_initiative(&svc, &objective.id, 10.0, None).await;
        let mut draft = initiative_draft(&objective.id, 20.0, None);
        draft.strategic_objective_id = None;
        draft.program_id = Some(program.id);
        svc.create_initiative(draft).await.unwrap();

        let err = svc
            .update_objective(&objective.id, ObjectiveUpdateBuilder::new().weight(15.0).build())
            .await
            .unwrap_err();
        let message = &err.validation_errors().unwrap().get("weight").unwrap()[0];
        assert!(message.contains("Weight 20 exceeds"), "{message}");

        let err = svc
            .update_objective(
                &objective.id,
                ObjectiveUpdateBuilder::new().planner_weight(Some(1.0)).build(),
            )
            .await
            .unwrap_err();
        assert!(err.validation_errors().unwrap().contains_field("weight"));
        assert!((svc.get_objective(&objective.id).await.unwrap().weight - 30.0).abs() < f64::EPSILON);

        assert!(
            svc.update_objective(&objective.id, ObjectiveUpdateBuilder::new().weight(20.0).build())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn create_objective_roundtrip() {
        let svc = test_service().await;
        let objective = seed_objective(&svc, 30.0).await;

        assert!(objective.id.starts_with("obj-"));
        let fetched = svc.get_objective(&objective.id).await.unwrap();
        assert_eq!(fetched, objective);
        assert_eq!(svc.list_objectives().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn out_of_range_weight_rejected() {
        let svc = test_service().await;
        let err = svc
            .create_objective(NewObjective {
                title: "Too heavy".into(),
                description: None,
                weight: 140.0,
                planner_weight: Some(-1.0),
                is_default: true,
            })
            .await
            .unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert!(errors.contains_field("weight"));
        assert!(errors.contains_field("planner_weight"));
        assert!(svc.list_objectives().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn planner_weight_update_changes_effective_weight() {
        let svc = test_service().await;
        let objective = seed_objective(&svc, 30.0).await;

        let update = ObjectiveUpdateBuilder::new().planner_weight(Some(20.0)).build();
        let updated = svc.update_objective(&objective.id, update).await.unwrap();
        assert!((updated.effective_weight() - 20.0).abs() < f64::EPSILON);

        let view = svc.get_objective_view(&objective.id).await.unwrap();
        assert!((view.effective_weight - 20.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn objective_view_shows_only_visible_initiatives() {
        let mut svc = test_service().await;
        let org_a = seed_org(&svc, "A").await;
        let org_b = seed_org(&svc, "B").await;
        let objective = seed_objective(&svc, 50.0).await;
        seed_initiative(&svc, &objective.id, 10.0, None).await;
        seed_initiative(&svc, &objective.id, 7.0, Some(&org_a.id)).await;
        seed_initiative(&svc, &objective.id, 5.0, Some(&org_b.id)).await;

        svc.set_requester(Some(Requester::in_organization("u-a", &org_a.id)));
        let view = svc.get_objective_view(&objective.id).await.unwrap();
        assert_eq!(view.initiatives.len(), 2);
        assert!((view.total_initiatives_weight - 17.0).abs() < f64::EPSILON);

        svc.set_requester(None);
        let view = svc.get_objective_view(&objective.id).await.unwrap();
        assert_eq!(view.initiatives.len(), 1);
        assert!((view.total_initiatives_weight - 10.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn delete_missing_objective_is_not_found() {
        let svc = test_service().await;
        assert!(svc.delete_objective("obj-nope").await.unwrap_err().is_not_found());
    }
}
