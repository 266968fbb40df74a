//! Organization-scoped visibility.
//!
//! A record is either global (no owning organization) or owned by exactly one
//! organization. A requester sees every global record plus the records owned
//! by their own organization, never a record owned by another organization.
//!
//! This is the only implementation of that predicate. Display lists, weight
//! totals, sibling sets for weight checks and plan assembly all go through
//! [`filter_visible`], so the records a caller sees are exactly the records
//! their ceilings are computed from.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rules::weight::Weighted;

/// Who a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "organization_id", rename_all = "snake_case")]
pub enum Scope {
    /// Organization-null default, visible to everyone.
    Global,
    /// Owned by one organization.
    OwnedBy(String),
}

impl Scope {
    #[must_use]
    pub fn from_organization(organization_id: Option<&str>) -> Self {
        organization_id.map_or(Self::Global, |org| Self::OwnedBy(org.to_string()))
    }

    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::OwnedBy(org) => Some(org),
        }
    }

    /// Whether a requester from `requester_org` may see a record in this scope.
    #[must_use]
    pub fn is_visible_to(&self, requester_org: Option<&str>) -> bool {
        match self {
            Self::Global => true,
            Self::OwnedBy(owner) => requester_org == Some(owner.as_str()),
        }
    }
}

/// Anything carrying a visibility scope.
pub trait Scoped {
    fn scope(&self) -> Scope;

    fn is_visible_to(&self, requester_org: Option<&str>) -> bool {
        self.scope().is_visible_to(requester_org)
    }
}

/// Keep only the records `requester_org` may see, preserving order.
pub fn filter_visible<T, I>(items: I, requester_org: Option<&str>) -> Vec<T>
where
    T: Scoped,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .filter(|item| item.is_visible_to(requester_org))
        .collect()
}

/// Sum of weights over the records `requester_org` may see.
pub fn visible_weight_total<'a, T, I>(items: I, requester_org: Option<&str>) -> f64
where
    T: Scoped + Weighted + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter(|item| item.is_visible_to(requester_org))
        .map(Weighted::weight)
        .sum()
}
