use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rules::visibility::{Scope, Scoped};
use crate::rules::weight::Weighted;
use crate::validation::RuleViolation;

/// The single parent an initiative hangs under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum InitiativeParent {
    Objective(String),
    Program(String),
}

impl InitiativeParent {
    /// Build the parent from the two optional inbound foreign keys.
    ///
    /// # Errors
    ///
    /// Returns `RuleViolation::InvalidInitiativeParent` unless exactly one id is given.
    pub fn from_ids(
        strategic_objective_id: Option<String>,
        program_id: Option<String>,
    ) -> Result<Self, RuleViolation> {
        match (strategic_objective_id, program_id) {
            (Some(objective), None) => Ok(Self::Objective(objective)),
            (None, Some(program)) => Ok(Self::Program(program)),
            _ => Err(RuleViolation::InvalidInitiativeParent),
        }
    }

    #[must_use]
    pub fn objective_id(&self) -> Option<&str> {
        match self {
            Self::Objective(id) => Some(id),
            Self::Program(_) => None,
        }
    }

    #[must_use]
    pub fn program_id(&self) -> Option<&str> {
        match self {
            Self::Program(id) => Some(id),
            Self::Objective(_) => None,
        }
    }
}

/// A weighted strategic initiative under an objective or a program.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StrategicInitiative {
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub parent: InitiativeParent,
    pub organization_id: Option<String>,
    /// Global template; visible to every organization regardless of owner.
    pub is_default: bool,
    pub initiative_feed_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scoped for StrategicInitiative {
    fn scope(&self) -> Scope {
        if self.is_default {
            Scope::Global
        } else {
            Scope::from_organization(self.organization_id.as_deref())
        }
    }
}

impl Weighted for StrategicInitiative {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Catalogue entry initiatives can be instantiated from.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InitiativeFeed {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub strategic_objective_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
