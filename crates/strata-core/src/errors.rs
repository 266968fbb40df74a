//! Cross-cutting error types for Strata.
//!
//! Store-specific errors (`DatabaseError`) live in `strata-db` and wrap these.

use thiserror::Error;

use crate::enums::{OrgRole, PlanStatus};

/// The caller holds the wrong role, or the target is in the wrong state,
/// for the requested operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationFailure {
    /// Reviews can only be recorded by an evaluator.
    #[error("Only evaluators can review plans (evaluator role is {role})")]
    InvalidReviewerRole { role: OrgRole },

    /// Reviews can only be recorded against a submitted plan.
    #[error("Plan must be SUBMITTED to be reviewed (current status: {status})")]
    PlanNotSubmitted { status: PlanStatus },
}

/// Errors raised by the rules in `strata-core` outside a single write's
/// validation map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },
}
