//! Entity structs for the planning hierarchy.
//!
//! Each entity maps to a table in the libSQL database (see
//! `strata-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.
//! Derived values (effective weight, funding totals) are methods, never fields.

mod activity;
mod costing;
mod funding;
mod initiative;
mod measure;
mod objective;
mod organization;
mod plan;
mod program;
mod targets;

pub use activity::MainActivity;
pub use costing::{
    Accommodation, AirTransport, LandTransport, Location, ParticipantCost, PerDiem, PrintingCost,
    ProcurementItem, SessionCost, SupervisorCost,
};
pub use funding::{ActivityBudget, CostDetails, FundingLines, SubActivity};
pub use initiative::{InitiativeFeed, InitiativeParent, StrategicInitiative};
pub use measure::PerformanceMeasure;
pub use objective::StrategicObjective;
pub use organization::{Organization, OrganizationUser};
pub use plan::{Plan, PlanReview};
pub use program::Program;
pub use targets::Targets;
