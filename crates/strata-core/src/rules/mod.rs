//! Business rules for the planning hierarchy.
//!
//! Every rule is a pure function over entities or drafts. Callers gather the
//! inputs (parents, siblings) from the store, run the rules, fold violations
//! into a [`ValidationErrors`](crate::validation::ValidationErrors), and only
//! write when it is empty.
//!
//! - [`weight`]: objective → initiative → activity/measure weight ceilings
//! - [`targets`]: quarterly/annual target consistency and period selection
//! - [`funding`]: estimated cost, total funding, and funding gap
//! - [`visibility`]: the organization scope predicate shared by every read and rule
//! - [`plan`]: plan draft checks, review gating, and plan objective assembly

pub mod funding;
pub mod plan;
pub mod targets;
pub mod visibility;
pub mod weight;
