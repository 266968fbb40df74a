//! Organization and membership repository.

use chrono::Utc;

use strata_core::drafts::{NewMembership, NewOrganization};
use strata_core::entities::{Organization, OrganizationUser};
use strata_core::ids::{PREFIX_MEMBERSHIP, PREFIX_ORGANIZATION};
use strata_core::responses::OrganizationView;
use strata_core::validation::RuleViolation;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_json_list, to_json_text};
use crate::service::{StrataService, reject};

const ORG_COLS: &str =
    "id, name, org_type, parent_id, vision, mission, core_values, created_at, updated_at";

const MEMBER_COLS: &str =
    "id, user_id, username, first_name, last_name, organization_id, role, created_at";

fn row_to_organization(row: &libsql::Row) -> Result<Organization, DatabaseError> {
    Ok(Organization {
        id: row.get(0)?,
        name: row.get(1)?,
        org_type: get_opt_string(row, 2)?,
        parent_id: get_opt_string(row, 3)?,
        vision: get_opt_string(row, 4)?,
        mission: get_opt_string(row, 5)?,
        core_values: parse_json_list(&row.get::<String>(6)?)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

fn row_to_membership(row: &libsql::Row) -> Result<OrganizationUser, DatabaseError> {
    Ok(OrganizationUser {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        organization_id: row.get(5)?,
        role: parse_enum(&row.get::<String>(6)?)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl StrataService {
    pub async fn create_organization(
        &self,
        draft: NewOrganization,
    ) -> Result<Organization, DatabaseError> {
        if draft.name.trim().is_empty() {
            return Err(reject("organization", RuleViolation::Blank { field: "name" }.into()));
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ORGANIZATION).await?;

        self.db().conn().execute(
            &format!("INSERT INTO organizations ({ORG_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            libsql::params![
                id.as_str(),
                draft.name.as_str(),
                draft.org_type.as_deref(),
                draft.parent_id.as_deref(),
                draft.vision.as_deref(),
                draft.mission.as_deref(),
                to_json_text(&draft.core_values)?,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(organization_id = %id, "created organization");

        Ok(Organization {
            id,
            name: draft.name,
            org_type: draft.org_type,
            parent_id: draft.parent_id,
            vision: draft.vision,
            mission: draft.mission,
            core_values: draft.core_values,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_organization(&self, id: &str) -> Result<Organization, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {ORG_COLS} FROM organizations WHERE id = ?1"),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("organization", id))?;
        row_to_organization(&row)
    }

    /// Name of an organization, `None` for global records or a dangling id.
    pub async fn organization_name(
        &self,
        id: Option<&str>,
    ) -> Result<Option<String>, DatabaseError> {
        let Some(id) = id else {
            return Ok(None);
        };
        match self.get_organization(id).await {
            Ok(org) => Ok(Some(org.name)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn get_organization_view(&self, id: &str) -> Result<OrganizationView, DatabaseError> {
        let organization = self.get_organization(id).await?;
        let parent_name = self.organization_name(organization.parent_id.as_deref()).await?;
        Ok(OrganizationView {
            organization,
            parent_name,
        })
    }

    pub async fn list_organizations(&self) -> Result<Vec<Organization>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT {ORG_COLS} FROM organizations ORDER BY name LIMIT {}",
                self.default_limit()
            ),
            (),
        ).await?;

        let mut orgs = Vec::new();
        while let Some(row) = rows.next().await? {
            orgs.push(row_to_organization(&row)?);
        }
        Ok(orgs)
    }

    pub async fn create_membership(
        &self,
        draft: NewMembership,
    ) -> Result<OrganizationUser, DatabaseError> {
        if draft.username.trim().is_empty() {
            return Err(reject("membership", RuleViolation::Blank { field: "username" }.into()));
        }
        self.get_organization(&draft.organization_id).await?;

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_MEMBERSHIP).await?;

        self.db().conn().execute(
            &format!("INSERT INTO memberships ({MEMBER_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            libsql::params![
                id.as_str(),
                draft.user_id.as_str(),
                draft.username.as_str(),
                draft.first_name.as_str(),
                draft.last_name.as_str(),
                draft.organization_id.as_str(),
                draft.role.as_str(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(membership_id = %id, organization_id = %draft.organization_id, role = %draft.role, "created membership");

        Ok(OrganizationUser {
            id,
            user_id: draft.user_id,
            username: draft.username,
            first_name: draft.first_name,
            last_name: draft.last_name,
            organization_id: draft.organization_id,
            role: draft.role,
            created_at: now,
        })
    }

    pub async fn get_membership(&self, id: &str) -> Result<OrganizationUser, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {MEMBER_COLS} FROM memberships WHERE id = ?1"),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("membership", id))?;
        row_to_membership(&row)
    }

    pub async fn list_memberships(
        &self,
        organization_id: &str,
    ) -> Result<Vec<OrganizationUser>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT {MEMBER_COLS} FROM memberships WHERE organization_id = ?1 ORDER BY created_at"
            ),
            [organization_id],
        ).await?;

        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(row_to_membership(&row)?);
        }
        Ok(members)
    }

    /// Memberships of one user, oldest first. The first one determines the
    /// organization a requester acts for.
    pub async fn memberships_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<OrganizationUser>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {MEMBER_COLS} FROM memberships WHERE user_id = ?1 ORDER BY created_at, id"),
            [user_id],
        ).await?;

        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(row_to_membership(&row)?);
        }
        Ok(members)
    }
}
