//! Database error types for strata-db.

use strata_core::errors::{AuthorizationFailure, CoreError};
use strata_core::validation::ValidationErrors;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// One or more business rules rejected the write. Nothing was written.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Wrong role or wrong plan status for a review.
    #[error("Not authorized: {0}")]
    Authorization(#[from] AuthorizationFailure),

    /// Lookup by id returned no row.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A row could not be parsed into its entity.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid state encountered (e.g., a disallowed status transition).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("Persistence error: {0}")]
    Persistence(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    #[must_use]
    pub fn not_found(entity_type: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.into(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The field → message map, if this is a validation failure.
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for DatabaseError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<CoreError> for DatabaseError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTransition { .. } => Self::InvalidState(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::enums::OrgRole;
    use strata_core::validation::RuleViolation;

    #[test]
    fn invalid_transition_maps_onto_invalid_state() {
        let err: DatabaseError = CoreError::InvalidTransition {
            entity_type: "plan".into(),
            id: "pln-1".into(),
            from: "APPROVED".into(),
            to: "SUBMITTED".into(),
        }
        .into();
        assert!(matches!(
            err,
            DatabaseError::InvalidState(ref message)
                if message == "Invalid state transition: plan pln-1 from APPROVED to SUBMITTED"
        ));
    }

    #[test]
    fn authorization_failures_convert() {
        let err: DatabaseError = AuthorizationFailure::InvalidReviewerRole { role: OrgRole::User }.into();
        assert!(matches!(err, DatabaseError::Authorization(_)));
        assert!(DatabaseError::from(ValidationErrors::from(RuleViolation::MissingEstimatedCost))
            .validation_errors()
            .is_some());
    }
}
