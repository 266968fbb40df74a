//! Quarterly target consistency.
//!
//! | shape      | rule                                                        |
//! |------------|-------------------------------------------------------------|
//! | cumulative | q1+q2+q3+q4 = annual                                        |
//! | increasing | q1 ≤ q2 ≤ q3 ≤ q4, q1 ≥ baseline, q4 = annual               |
//! | decreasing | q1 ≥ q2 ≥ q3 ≥ q4, q1 ≤ baseline, q4 = annual               |
//! | constant   | q1 = q2 = q3 = q4 = annual                                  |
//!
//! Equalities allow [`TOLERANCE`]. A baseline that is not a number skips the
//! baseline rule. Activities additionally require a positive annual target;
//! measures do not.

use crate::entities::Targets;
use crate::enums::TargetType;
use crate::validation::{RuleViolation, ValidationErrors};

pub use crate::rules::weight::TOLERANCE;

const QUARTERS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

/// Which record the targets belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOwner {
    Measure,
    Activity,
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE
}

/// At least one month or quarter must be selected.
///
/// # Errors
///
/// Returns `RuleViolation::MissingPeriodSelection` when both lists are empty.
pub fn check_period_selection(targets: &Targets) -> Result<(), RuleViolation> {
    if targets.selected_months.is_empty() && targets.selected_quarters.is_empty() {
        return Err(RuleViolation::MissingPeriodSelection);
    }
    Ok(())
}

/// Per-value bounds: quarters are non-negative; activity annual targets are positive.
#[must_use]
pub fn check_bounds(targets: &Targets, owner: TargetOwner) -> Vec<RuleViolation> {
    let mut violations: Vec<RuleViolation> = targets
        .quarters()
        .iter()
        .zip(QUARTERS)
        .filter(|(value, _)| **value < 0.0)
        .map(|(_, quarter)| RuleViolation::NegativeTarget { quarter })
        .collect();

    if owner == TargetOwner::Activity && targets.annual_target <= 0.0 {
        violations.push(RuleViolation::NonPositiveAnnualTarget);
    }
    violations
}

/// The shape rule selected by `target_type`.
#[must_use]
pub fn check_shape(targets: &Targets) -> Vec<RuleViolation> {
    let [q1, q2, q3, q4] = targets.quarters();
    let annual = targets.annual_target;
    let baseline = targets.numeric_baseline();
    let mut violations = Vec::new();

    match targets.target_type {
        TargetType::Cumulative => {
            let sum = targets.quarterly_sum();
            if !approx_eq(sum, annual) {
                violations.push(RuleViolation::TargetSumMismatch { sum, annual });
            }
        }
        TargetType::Increasing => {
            if !(q1 <= q2 && q2 <= q3 && q3 <= q4) {
                violations.push(RuleViolation::TargetOrderViolation(
                    "Quarterly targets must not decrease for an increasing target".into(),
                ));
            }
            if let Some(baseline) = baseline {
                if q1 < baseline {
                    violations.push(RuleViolation::TargetBoundaryViolation(format!(
                        "Q1 target ({q1}) must be at least the baseline ({baseline}) for an increasing target"
                    )));
                }
            }
            if !approx_eq(q4, annual) {
                violations.push(RuleViolation::TargetBoundaryViolation(format!(
                    "Q4 target ({q4}) must equal the annual target ({annual}) for an increasing target"
                )));
            }
        }
        TargetType::Decreasing => {
            if !(q1 >= q2 && q2 >= q3 && q3 >= q4) {
                violations.push(RuleViolation::TargetOrderViolation(
                    "Quarterly targets must not increase for a decreasing target".into(),
                ));
            }
            if let Some(baseline) = baseline {
                if q1 > baseline {
                    violations.push(RuleViolation::TargetOrderViolation(format!(
                        "Q1 target ({q1}) must not exceed the baseline ({baseline}) for a decreasing target"
                    )));
                }
            }
            if !approx_eq(q4, annual) {
                violations.push(RuleViolation::TargetOrderViolation(format!(
                    "Q4 target ({q4}) must equal the annual target ({annual}) for a decreasing target"
                )));
            }
        }
        TargetType::Constant => {
            if !targets.quarters().iter().all(|q| approx_eq(*q, annual)) {
                violations.push(RuleViolation::TargetConstantMismatch { annual });
            }
        }
    }
    violations
}

/// Every target rule for one record, collected.
#[must_use]
pub fn validate_targets(targets: &Targets, owner: TargetOwner) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check(check_period_selection(targets));
    for violation in check_bounds(targets, owner)
        .into_iter()
        .chain(check_shape(targets))
    {
        errors.push(&violation);
    }
    errors
}
