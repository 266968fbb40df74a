//! Rule violations and the field → message map returned to callers.
//!
//! Every rule in [`crate::rules`] reports failures as a [`RuleViolation`].
//! A write operation runs all of its rules, folds the violations into one
//! [`ValidationErrors`], and rejects the write if the map is non-empty.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key used for failures that concern the record as a whole.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// A single user-correctable business rule failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleViolation {
    #[error("At least one month or quarter must be selected")]
    MissingPeriodSelection,

    #[error("{quarter} target cannot be negative")]
    NegativeTarget { quarter: &'static str },

    #[error("Annual target must be greater than 0")]
    NonPositiveAnnualTarget,

    #[error("Sum of quarterly targets ({sum}) must equal annual target ({annual})")]
    TargetSumMismatch { sum: f64, annual: f64 },

    #[error("{0}")]
    TargetOrderViolation(String),

    #[error("{0}")]
    TargetBoundaryViolation(String),

    #[error("All quarterly targets must equal the annual target ({annual})")]
    TargetConstantMismatch { annual: f64 },

    #[error("Weight {weight} exceeds the parent objective's effective weight {ceiling}")]
    WeightExceedsParent { weight: f64, ceiling: f64 },

    #[error(
        "Total {kind} weight ({total}) cannot exceed {ceiling} ({percent}% of initiative weight). \
         Remaining weight: {remaining}"
    )]
    WeightExceedsAllocation {
        kind: &'static str,
        total: f64,
        ceiling: f64,
        percent: u32,
        remaining: f64,
    },

    #[error("Initiative must belong to exactly one of a strategic objective or a program")]
    InvalidInitiativeParent,

    #[error("At least one estimated cost must be greater than 0")]
    MissingEstimatedCost,

    #[error("{field} must be a finite number")]
    NonFiniteAmount { field: &'static str },

    #[error("{field} must be between 0 and 100")]
    WeightOutOfRange { field: &'static str },

    #[error("Start date must not be after end date")]
    InvalidDateRange,

    #[error("Objective {0} does not exist")]
    UnknownObjective(String),

    #[error("Weight override given for objective {0}, which is not selected")]
    UnselectedObjectiveWeight(String),

    #[error("{field} cannot be empty")]
    Blank { field: &'static str },
}

impl RuleViolation {
    /// Inbound field the violation is reported under.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingPeriodSelection
            | Self::InvalidInitiativeParent
            | Self::MissingEstimatedCost
            | Self::TargetSumMismatch { .. }
            | Self::TargetOrderViolation(_)
            | Self::TargetConstantMismatch { .. } => NON_FIELD_ERRORS,
            Self::NegativeTarget { quarter } => match *quarter {
                "Q1" => "q1_target",
                "Q2" => "q2_target",
                "Q3" => "q3_target",
                _ => "q4_target",
            },
            Self::NonPositiveAnnualTarget | Self::TargetBoundaryViolation(_) => "annual_target",
            Self::WeightExceedsParent { .. } | Self::WeightExceedsAllocation { .. } => "weight",
            Self::WeightOutOfRange { field }
            | Self::Blank { field }
            | Self::NonFiniteAmount { field } => *field,
            Self::InvalidDateRange => "to_date",
            Self::UnknownObjective(_) => "selected_objectives",
            Self::UnselectedObjectiveWeight(_) => "selected_objectives_weights",
        }
    }
}

/// Ordered field → messages map of every rule failure for one write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation under its own field.
    pub fn push(&mut self, violation: &RuleViolation) {
        self.add(violation.field(), violation.to_string());
    }

    /// Record a free-form message under `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Fold the result of a single rule in.
    pub fn check(&mut self, result: Result<(), RuleViolation>) {
        if let Err(violation) = result {
            self.push(&violation);
        }
    }

    /// Merge another map into this one.
    pub fn extend(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when no violation was recorded, otherwise the map itself.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one violation was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl From<RuleViolation> for ValidationErrors {
    fn from(violation: RuleViolation) -> Self {
        let mut errors = Self::new();
        errors.push(&violation);
        errors
    }
}

impl FromIterator<RuleViolation> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = RuleViolation>>(iter: I) -> Self {
        let mut errors = Self::new();
        for violation in iter {
            errors.push(&violation);
        }
        errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join("; ")))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collects_messages_per_field() {
        let mut errors = ValidationErrors::new();
        errors.push(&RuleViolation::MissingPeriodSelection);
        errors.push(&RuleViolation::NonPositiveAnnualTarget);
        errors.push(&RuleViolation::NegativeTarget { quarter: "Q2" });

        assert!(!errors.is_empty());
        assert_eq!(
            errors.get(NON_FIELD_ERRORS),
            Some(&["At least one month or quarter must be selected".to_string()][..])
        );
        assert!(errors.contains_field("annual_target"));
        assert!(errors.contains_field("q2_target"));
    }

    #[test]
    fn check_ignores_ok() {
        let mut errors = ValidationErrors::new();
        errors.check(Ok(()));
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn serializes_as_plain_map() {
        let errors: ValidationErrors = [RuleViolation::Blank { field: "name" }]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"name": ["name cannot be empty"]}));
    }
}
