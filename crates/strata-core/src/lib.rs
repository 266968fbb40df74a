//! # strata-core
//!
//! Core types, business rules, and error types for Strata.
//!
//! This crate provides the foundational types shared across all Strata crates:
//! - Entity structs for the planning hierarchy (objectives, initiatives, measures, activities, plans)
//! - Coded enums and the plan status state machine
//! - Inbound drafts and outbound views with derived fields
//! - The rule engine: weight allocation, target consistency, funding, visibility, review
//! - ID prefix constants
//! - Cross-cutting error types and the field → message validation map

pub mod drafts;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod responses;
pub mod rules;
pub mod validation;
