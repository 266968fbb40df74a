//! Strategic initiative repository: parent weight ceiling, visibility-scoped views.

use chrono::Utc;

use strata_core::drafts::NewInitiative;
use strata_core::entities::{InitiativeParent, StrategicInitiative};
use strata_core::ids::PREFIX_INITIATIVE;
use strata_core::responses::InitiativeView;
use strata_core::rules::visibility::filter_visible;
use strata_core::rules::weight::{
    ChildKind, check_initiative_weight, check_scoped_allocation, check_weight_range,
};
use strata_core::validation::{RuleViolation, ValidationErrors};

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime};
use crate::service::{StrataService, ensure_valid, reject};
use crate::updates::initiative::InitiativeUpdate;

const SELECT_COLS: &str = "id, name, weight, strategic_objective_id, program_id, organization_id, \
                           is_default, initiative_feed_id, created_at, updated_at";

fn row_to_initiative(row: &libsql::Row) -> Result<StrategicInitiative, DatabaseError> {
    let id: String = row.get(0)?;
    let parent = InitiativeParent::from_ids(get_opt_string(row, 3)?, get_opt_string(row, 4)?)
        .map_err(|e| DatabaseError::Query(format!("initiative {id}: {e}")))?;
    Ok(StrategicInitiative {
        id,
        name: row.get(1)?,
        weight: row.get(2)?,
        parent,
        organization_id: get_opt_string(row, 5)?,
        is_default: get_bool(row, 6)?,
        initiative_feed_id: get_opt_string(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

impl StrataService {
    /// Effective weight of the objective an initiative hangs under.
    ///
    /// `Ok(None)` when the parent (or the program's objective) no longer
    /// exists; the ceiling rule is then skipped. Any other failure propagates.
    async fn parent_effective_weight(
        &self,
        parent: &InitiativeParent,
    ) -> Result<Option<f64>, DatabaseError> {
        let objective_id = match parent {
            InitiativeParent::Objective(id) => id.clone(),
            InitiativeParent::Program(program_id) => match self.get_program(program_id).await {
                Ok(program) => program.strategic_objective_id,
                Err(e) if e.is_not_found() => {
                    tracing::warn!(program_id = %program_id, "parent program missing, skipping weight ceiling");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            },
        };

        match self.get_objective(&objective_id).await {
            Ok(objective) => Ok(Some(objective.effective_weight())),
            Err(e) if e.is_not_found() => {
                tracing::warn!(objective_id = %objective_id, "parent objective missing, skipping weight ceiling");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn validate_initiative(
        &self,
        name: &str,
        weight: f64,
        parent: &InitiativeParent,
    ) -> Result<ValidationErrors, DatabaseError> {
        let mut errors = ValidationErrors::new();
        if name.trim().is_empty() {
            errors.push(&RuleViolation::Blank { field: "name" });
        }
        errors.check(check_weight_range("weight", weight));
        if let Some(ceiling) = self.parent_effective_weight(parent).await? {
            errors.check(check_initiative_weight(weight, ceiling));
        }
        Ok(errors)
    }

    /// Existing measures and activities must still fit the initiative's
    /// weight, in every scope they render under.
    async fn validate_children_fit(
        &self,
        initiative: &StrategicInitiative,
    ) -> Result<ValidationErrors, DatabaseError> {
        let mut errors = ValidationErrors::new();
        let activities = self.activities_for_initiative(&initiative.id).await?;
        errors.check(check_scoped_allocation(
            ChildKind::Activity,
            initiative.weight,
            &activities,
            None,
        ));
        let measures = self.measures_for_initiative(&initiative.id).await?;
        errors.check(check_scoped_allocation(
            ChildKind::Measure,
            initiative.weight,
            &measures,
            None,
        ));
        Ok(errors)
    }

    pub async fn create_initiative(
        &self,
        draft: NewInitiative,
    ) -> Result<StrategicInitiative, DatabaseError> {
        let parent = match InitiativeParent::from_ids(draft.strategic_objective_id, draft.program_id) {
            Ok(parent) => parent,
            Err(violation) => return Err(reject("initiative", violation.into())),
        };
        let errors = self.validate_initiative(&draft.name, draft.weight, &parent).await?;
        ensure_valid("initiative", errors)?;

        let now = Utc::now();
        let initiative = StrategicInitiative {
            id: self.db().generate_id(PREFIX_INITIATIVE).await?,
            name: draft.name,
            weight: draft.weight,
            parent,
            organization_id: draft.organization_id,
            is_default: draft.is_default,
            initiative_feed_id: draft.initiative_feed_id,
            created_at: now,
            updated_at: now,
        };

        self.db().conn().execute(
            &format!("INSERT INTO initiatives ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
            libsql::params![
                initiative.id.as_str(),
                initiative.name.as_str(),
                initiative.weight,
                initiative.parent.objective_id(),
                initiative.parent.program_id(),
                initiative.organization_id.as_deref(),
                i64::from(initiative.is_default),
                initiative.initiative_feed_id.as_deref(),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(initiative_id = %initiative.id, weight = initiative.weight, "created initiative");

        Ok(initiative)
    }

    pub async fn get_initiative(&self, id: &str) -> Result<StrategicInitiative, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {SELECT_COLS} FROM initiatives WHERE id = ?1"),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("initiative", id))?;
        row_to_initiative(&row)
    }

    async fn query_initiatives(
        &self,
        column: &str,
        parent_id: &str,
    ) -> Result<Vec<StrategicInitiative>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {SELECT_COLS} FROM initiatives WHERE {column} = ?1 ORDER BY created_at, id"),
            [parent_id],
        ).await?;

        let mut initiatives = Vec::new();
        while let Some(row) = rows.next().await? {
            initiatives.push(row_to_initiative(&row)?);
        }
        Ok(initiatives)
    }

    /// Every initiative directly under an objective, unfiltered.
    pub(crate) async fn initiatives_for_objective(
        &self,
        objective_id: &str,
    ) -> Result<Vec<StrategicInitiative>, DatabaseError> {
        self.query_initiatives("strategic_objective_id", objective_id).await
    }

    /// Every initiative under a program, unfiltered.
    pub(crate) async fn initiatives_for_program(
        &self,
        program_id: &str,
    ) -> Result<Vec<StrategicInitiative>, DatabaseError> {
        self.query_initiatives("program_id", program_id).await
    }

    /// Initiatives under an objective that the requester may see.
    pub async fn list_initiatives_for_objective(
        &self,
        objective_id: &str,
    ) -> Result<Vec<StrategicInitiative>, DatabaseError> {
        Ok(filter_visible(
            self.initiatives_for_objective(objective_id).await?,
            self.requester_org(),
        ))
    }

    pub async fn update_initiative(
        &self,
        id: &str,
        update: InitiativeUpdate,
    ) -> Result<StrategicInitiative, DatabaseError> {
        let mut initiative = self.get_initiative(id).await?;
        update.apply(&mut initiative);
        let mut errors = self
            .validate_initiative(&initiative.name, initiative.weight, &initiative.parent)
            .await?;
        errors.extend(self.validate_children_fit(&initiative).await?);
        ensure_valid("initiative", errors)?;

        initiative.updated_at = Utc::now();
        self.db().conn().execute(
            "UPDATE initiatives SET name = ?1, weight = ?2, strategic_objective_id = ?3, program_id = ?4, \
             organization_id = ?5, is_default = ?6, initiative_feed_id = ?7, updated_at = ?8 WHERE id = ?9",
            libsql::params![
                initiative.name.as_str(),
                initiative.weight,
                initiative.parent.objective_id(),
                initiative.parent.program_id(),
                initiative.organization_id.as_deref(),
                i64::from(initiative.is_default),
                initiative.initiative_feed_id.as_deref(),
                initiative.updated_at.to_rfc3339(),
                id
            ],
        ).await?;
        tracing::debug!(initiative_id = %id, "updated initiative");

        Ok(initiative)
    }

    pub async fn delete_initiative(&self, id: &str) -> Result<(), DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM initiatives WHERE id = ?1", [id])
            .await?;
        if affected == 0 {
            return Err(DatabaseError::not_found("initiative", id));
        }
        tracing::debug!(initiative_id = %id, "deleted initiative");
        Ok(())
    }

    /// One initiative with the measures and activities visible to `requester_org`.
    pub(crate) async fn initiative_view(
        &self,
        initiative: StrategicInitiative,
        requester_org: Option<&str>,
    ) -> Result<InitiativeView, DatabaseError> {
        let organization_name = self
            .organization_name(initiative.organization_id.as_deref())
            .await?;
        let initiative_feed_name = match initiative.initiative_feed_id.as_deref() {
            Some(feed_id) => match self.get_initiative_feed(feed_id).await {
                Ok(feed) => Some(feed.name),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        let measures = filter_visible(self.measures_for_initiative(&initiative.id).await?, requester_org);
        let activities = filter_visible(self.activities_for_initiative(&initiative.id).await?, requester_org);
        let performance_measures = self.measure_views(measures).await?;
        let main_activities = self.activity_views(activities).await?;

        Ok(InitiativeView::new(
            initiative,
            organization_name,
            initiative_feed_name,
            performance_measures,
            main_activities,
        ))
    }

    pub(crate) async fn initiative_views(
        &self,
        initiatives: Vec<StrategicInitiative>,
        requester_org: Option<&str>,
    ) -> Result<Vec<InitiativeView>, DatabaseError> {
        let mut views = Vec::with_capacity(initiatives.len());
        for initiative in initiatives {
            views.push(self.initiative_view(initiative, requester_org).await?);
        }
        Ok(views)
    }

    /// Initiative with the measures and activities the requester may see.
    pub async fn get_initiative_view(&self, id: &str) -> Result<InitiativeView, DatabaseError> {
        let initiative = self.get_initiative(id).await?;
        self.initiative_view(initiative, self.requester_org()).await
    }
}
