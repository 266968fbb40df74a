//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. `apply` copies
//! only the `Some` fields onto a loaded entity, after which the repo re-runs
//! every rule against the merged record before writing it back.

pub mod activity;
pub mod initiative;
pub mod measure;
pub mod objective;
pub mod plan;
pub mod sub_activity;
