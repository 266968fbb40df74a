//! Program repository.

use chrono::Utc;

use strata_core::drafts::NewProgram;
use strata_core::entities::Program;
use strata_core::ids::PREFIX_PROGRAM;
use strata_core::responses::ProgramView;
use strata_core::rules::visibility::filter_visible;
use strata_core::validation::RuleViolation;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime};
use crate::service::{StrataService, reject};

const SELECT_COLS: &str =
    "id, name, description, strategic_objective_id, is_default, created_at, updated_at";

fn row_to_program(row: &libsql::Row) -> Result<Program, DatabaseError> {
    Ok(Program {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        strategic_objective_id: row.get(3)?,
        is_default: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl StrataService {
    pub async fn create_program(&self, draft: NewProgram) -> Result<Program, DatabaseError> {
        if draft.name.trim().is_empty() {
            return Err(reject("program", RuleViolation::Blank { field: "name" }.into()));
        }
        self.get_objective(&draft.strategic_objective_id).await?;

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_PROGRAM).await?;

        self.db().conn().execute(
            &format!("INSERT INTO programs ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            libsql::params![
                id.as_str(),
                draft.name.as_str(),
                draft.description.as_deref(),
                draft.strategic_objective_id.as_str(),
                i64::from(draft.is_default),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(program_id = %id, objective_id = %draft.strategic_objective_id, "created program");

        Ok(Program {
            id,
            name: draft.name,
            description: draft.description,
            strategic_objective_id: draft.strategic_objective_id,
            is_default: draft.is_default,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_program(&self, id: &str) -> Result<Program, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {SELECT_COLS} FROM programs WHERE id = ?1"),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("program", id))?;
        row_to_program(&row)
    }

    pub async fn list_programs_for_objective(
        &self,
        objective_id: &str,
    ) -> Result<Vec<Program>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT {SELECT_COLS} FROM programs WHERE strategic_objective_id = ?1 ORDER BY created_at, id"
            ),
            [objective_id],
        ).await?;

        let mut programs = Vec::new();
        while let Some(row) = rows.next().await? {
            programs.push(row_to_program(&row)?);
        }
        Ok(programs)
    }

    pub async fn delete_program(&self, id: &str) -> Result<(), DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM programs WHERE id = ?1", [id])
            .await?;
        if affected == 0 {
            return Err(DatabaseError::not_found("program", id));
        }
        tracing::debug!(program_id = %id, "deleted program");
        Ok(())
    }

    /// One program with the initiatives visible to `requester_org`.
    pub(crate) async fn program_view(
        &self,
        program: Program,
        requester_org: Option<&str>,
    ) -> Result<ProgramView, DatabaseError> {
        let strategic_objective_title = match self.get_objective(&program.strategic_objective_id).await {
            Ok(objective) => Some(objective.title),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        let initiatives = filter_visible(
            self.initiatives_for_program(&program.id).await?,
            requester_org,
        );
        let initiatives = self.initiative_views(initiatives, requester_org).await?;

        Ok(ProgramView {
            program,
            strategic_objective_title,
            initiatives,
        })
    }

    pub(crate) async fn program_views(
        &self,
        programs: Vec<Program>,
        requester_org: Option<&str>,
    ) -> Result<Vec<ProgramView>, DatabaseError> {
        let mut views = Vec::with_capacity(programs.len());
        for program in programs {
            views.push(self.program_view(program, requester_org).await?);
        }
        Ok(views)
    }

    /// Program with the initiatives the requester may see.
    pub async fn get_program_view(&self, id: &str) -> Result<ProgramView, DatabaseError> {
        let program = self.get_program(id).await?;
        self.program_view(program, self.requester_org()).await
    }
}
