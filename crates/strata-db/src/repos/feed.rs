//! Initiative feed (catalogue) repository.

use chrono::Utc;

use strata_core::drafts::NewInitiativeFeed;
use strata_core::entities::InitiativeFeed;
use strata_core::ids::PREFIX_INITIATIVE_FEED;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime};
use crate::service::StrataService;

const SELECT_COLS: &str =
    "id, name, description, strategic_objective_id, is_active, created_at, updated_at";

fn row_to_feed(row: &libsql::Row) -> Result<InitiativeFeed, DatabaseError> {
    Ok(InitiativeFeed {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        strategic_objective_id: get_opt_string(row, 3)?,
        is_active: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl StrataService {
    pub async fn create_initiative_feed(
        &self,
        draft: NewInitiativeFeed,
    ) -> Result<InitiativeFeed, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_INITIATIVE_FEED).await?;

        self.db().conn().execute(
            &format!("INSERT INTO initiative_feeds ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            libsql::params![
                id.as_str(),
                draft.name.as_str(),
                draft.description.as_deref(),
                draft.strategic_objective_id.as_deref(),
                i64::from(draft.is_active),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(feed_id = %id, "created initiative feed");

        Ok(InitiativeFeed {
            id,
            name: draft.name,
            description: draft.description,
            strategic_objective_id: draft.strategic_objective_id,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_initiative_feed(&self, id: &str) -> Result<InitiativeFeed, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!("SELECT {SELECT_COLS} FROM initiative_feeds WHERE id = ?1"),
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("initiative_feed", id))?;
        row_to_feed(&row)
    }

    /// Active feeds, optionally narrowed to one objective.
    pub async fn list_initiative_feeds(
        &self,
        objective_id: Option<&str>,
    ) -> Result<Vec<InitiativeFeed>, DatabaseError> {
        let mut rows = match objective_id {
            Some(objective_id) => {
                self.db().conn().query(
                    &format!(
                        "SELECT {SELECT_COLS} FROM initiative_feeds \
                         WHERE is_active = 1 AND strategic_objective_id = ?1 ORDER BY name"
                    ),
                    [objective_id],
                ).await?
            }
            None => {
                self.db().conn().query(
                    &format!("SELECT {SELECT_COLS} FROM initiative_feeds WHERE is_active = 1 ORDER BY name"),
                    (),
                ).await?
            }
        };

        let mut feeds = Vec::new();
        while let Some(row) = rows.next().await? {
            feeds.push(row_to_feed(&row)?);
        }
        Ok(feeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_objective, test_service};

    #[tokio::test]
    async fn lists_only_active_feeds() {
        let svc = test_service().await;
        let objective = seed_objective(&svc, 30.0).await;
        for (name, active, objective_id) in [
            ("Clinics", true, Some(objective.id.clone())),
            ("Retired", false, Some(objective.id.clone())),
            ("Roads", true, None),
        ] {
            svc.create_initiative_feed(NewInitiativeFeed {
                name: name.into(),
                description: None,
                strategic_objective_id: objective_id,
                is_active: active,
            })
            .await
            .unwrap();
        }

        assert_eq!(svc.list_initiative_feeds(None).await.unwrap().len(), 2);
        let scoped = svc.list_initiative_feeds(Some(&objective.id)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].name, "Clinics");
        assert_eq!(svc.get_initiative_feed(&scoped[0].id).await.unwrap(), scoped[0]);
    }
}
