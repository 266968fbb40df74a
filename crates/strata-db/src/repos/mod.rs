//! Repository modules implementing the store operations for all Strata entities.
//!
//! Each module adds methods to `StrataService` via `impl StrataService` blocks.

pub mod activity;
pub mod budget;
pub mod costing;
pub mod feed;
pub mod initiative;
pub mod measure;
pub mod objective;
pub mod organization;
pub mod plan;
pub mod program;
pub mod review;
mod targets;
