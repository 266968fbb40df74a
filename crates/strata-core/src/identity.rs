use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::OrgRole;

/// The caller on whose behalf a request is evaluated.
///
/// Produced by whatever authentication layer embeds Strata. Contains only
/// data fields; no session or credential handling happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Requester {
    /// Authenticated user id.
    pub user_id: String,
    /// Organization of the caller's first membership. `None` = sees global records only.
    pub organization_id: Option<String>,
    /// Role inside that organization.
    pub role: Option<OrgRole>,
}

impl Requester {
    #[must_use]
    pub fn in_organization(user_id: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            organization_id: Some(organization_id.into()),
            role: None,
        }
    }

    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }
}
