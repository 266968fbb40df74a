//! Estimated cost, total funding, and funding gap.
//!
//! An activity is funded either by its sub-activities or, when it has none,
//! by its legacy single budget record. [`FundingSource`] names which one
//! applies; the store decides on every read and never caches the choice.

use std::iter::Sum;
use std::ops::Add;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ActivityBudget, FundingLines, SubActivity};
use crate::enums::BudgetCalculationType;
use crate::validation::RuleViolation;

impl FundingLines {
    /// The estimated cost selected by the calculation type.
    #[must_use]
    pub const fn estimated_cost(&self) -> f64 {
        match self.budget_calculation_type {
            BudgetCalculationType::WithTool => self.estimated_cost_with_tool,
            BudgetCalculationType::WithoutTool => self.estimated_cost_without_tool,
        }
    }

    #[must_use]
    pub fn total_funding(&self) -> f64 {
        self.government_treasury + self.sdg_funding + self.partners_funding + self.other_funding
    }

    /// Negative when over-funded.
    #[must_use]
    pub fn funding_gap(&self) -> f64 {
        self.estimated_cost() - self.total_funding()
    }

    #[must_use]
    pub fn summary(&self) -> FundingSummary {
        FundingSummary {
            estimated_cost: self.estimated_cost(),
            total_funding: self.total_funding(),
            funding_gap: self.funding_gap(),
        }
    }
}

/// Derived funding figures of one budget line or an aggregate of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FundingSummary {
    pub estimated_cost: f64,
    pub total_funding: f64,
    pub funding_gap: f64,
}

impl Add for FundingSummary {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            estimated_cost: self.estimated_cost + rhs.estimated_cost,
            total_funding: self.total_funding + rhs.total_funding,
            funding_gap: self.funding_gap + rhs.funding_gap,
        }
    }
}

impl Sum for FundingSummary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Where an activity's funding figures come from.
#[derive(Debug, Clone, PartialEq)]
pub enum FundingSource {
    LegacyBudget(ActivityBudget),
    SubActivityList(Vec<SubActivity>),
}

impl FundingSource {
    /// Sub-activities win whenever there is at least one; otherwise the legacy
    /// budget is used if present.
    #[must_use]
    pub fn select(sub_activities: Vec<SubActivity>, legacy: Option<ActivityBudget>) -> Self {
        match legacy {
            Some(budget) if sub_activities.is_empty() => Self::LegacyBudget(budget),
            _ => Self::SubActivityList(sub_activities),
        }
    }

    #[must_use]
    pub fn summary(&self) -> FundingSummary {
        match self {
            Self::LegacyBudget(budget) => budget.funding.summary(),
            Self::SubActivityList(subs) => subs.iter().map(|s| s.funding.summary()).sum(),
        }
    }

    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyBudget(_))
    }
}

/// A budget line needs finite amounts and at least one positive estimated
/// cost.
///
/// # Errors
///
/// Returns `RuleViolation::NonFiniteAmount` for the first NaN or infinite
/// amount, else `RuleViolation::MissingEstimatedCost` when both costs are ≤ 0.
pub fn check_estimated_cost(lines: &FundingLines) -> Result<(), RuleViolation> {
    let amounts = [
        ("estimated_cost_with_tool", lines.estimated_cost_with_tool),
        ("estimated_cost_without_tool", lines.estimated_cost_without_tool),
        ("government_treasury", lines.government_treasury),
        ("sdg_funding", lines.sdg_funding),
        ("partners_funding", lines.partners_funding),
        ("other_funding", lines.other_funding),
    ];
    if let Some(&(field, _)) = amounts.iter().find(|(_, value)| !value.is_finite()) {
        return Err(RuleViolation::NonFiniteAmount { field });
    }
    if lines.estimated_cost_with_tool <= 0.0 && lines.estimated_cost_without_tool <= 0.0 {
        return Err(RuleViolation::MissingEstimatedCost);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CostDetails;
    use crate::enums::ActivityType;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn lines(calc: BudgetCalculationType, with_tool: f64, without_tool: f64, sources: [f64; 4]) -> FundingLines {
        FundingLines {
            budget_calculation_type: calc,
            estimated_cost_with_tool: with_tool,
            estimated_cost_without_tool: without_tool,
            government_treasury: sources[0],
            sdg_funding: sources[1],
            partners_funding: sources[2],
            other_funding: sources[3],
        }
    }

    fn sub(funding: FundingLines) -> SubActivity {
        SubActivity {
            id: "sac-1".into(),
            main_activity_id: "act-1".into(),
            name: "Training".into(),
            activity_type: ActivityType::Training,
            description: None,
            funding,
            details: CostDetails::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn legacy(funding: FundingLines) -> ActivityBudget {
        ActivityBudget {
            id: "bdg-1".into(),
            activity_id: "act-1".into(),
            sub_activity_label: None,
            activity_type: None,
            funding,
            details: CostDetails::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn with_tool_line() {
        let l = lines(BudgetCalculationType::WithTool, 100.0, 999.0, [40.0, 20.0, 10.0, 10.0]);
        assert_eq!(
            l.summary(),
            FundingSummary {
                estimated_cost: 100.0,
                total_funding: 80.0,
                funding_gap: 20.0,
            }
        );
    }

    #[test]
    fn without_tool_line_can_be_overfunded() {
        let l = lines(BudgetCalculationType::WithoutTool, 999.0, 50.0, [60.0, 0.0, 0.0, 0.0]);
        assert!((l.estimated_cost() - 50.0).abs() < f64::EPSILON);
        assert!((l.funding_gap() + 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sub_activities_are_summed() {
        let source = FundingSource::select(
            vec![
                sub(lines(BudgetCalculationType::WithTool, 100.0, 0.0, [80.0, 0.0, 0.0, 0.0])),
                sub(lines(BudgetCalculationType::WithoutTool, 0.0, 50.0, [0.0, 10.0, 10.0, 0.0])),
            ],
            Some(legacy(lines(BudgetCalculationType::WithTool, 1.0, 0.0, [0.0; 4]))),
        );
        assert!(!source.is_legacy());
        assert_eq!(
            source.summary(),
            FundingSummary {
                estimated_cost: 150.0,
                total_funding: 100.0,
                funding_gap: 50.0,
            }
        );
    }

    #[test]
    fn legacy_budget_used_without_sub_activities() {
        let source = FundingSource::select(
            vec![],
            Some(legacy(lines(BudgetCalculationType::WithTool, 70.0, 0.0, [30.0, 0.0, 0.0, 0.0]))),
        );
        assert!(source.is_legacy());
        assert!((source.summary().funding_gap - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nothing_budgeted_is_zero() {
        let source = FundingSource::select(vec![], None);
        assert_eq!(source.summary(), FundingSummary::default());
    }

    #[test]
    fn summary_is_stable_across_reads() {
        let source = FundingSource::select(
            vec![sub(lines(BudgetCalculationType::WithTool, 100.0, 0.0, [80.0, 0.0, 0.0, 0.0]))],
            None,
        );
        assert_eq!(source.summary(), source.summary());
    }

    #[test]
    fn estimated_cost_presence() {
        assert_eq!(
            check_estimated_cost(&lines(BudgetCalculationType::WithTool, 0.0, 0.0, [0.0; 4])),
            Err(RuleViolation::MissingEstimatedCost)
        );
        assert!(check_estimated_cost(&lines(BudgetCalculationType::WithTool, 0.0, 5.0, [0.0; 4])).is_ok());
    }

    #[test]
    fn non_finite_amounts_rejected() {
        assert_eq!(
            check_estimated_cost(&lines(BudgetCalculationType::WithTool, f64::NAN, 5.0, [0.0; 4])),
            Err(RuleViolation::NonFiniteAmount { field: "estimated_cost_with_tool" })
        );
        assert_eq!(
            check_estimated_cost(&lines(
                BudgetCalculationType::WithoutTool,
                0.0,
                5.0,
                [0.0, f64::INFINITY, 0.0, 0.0],
            )),
            Err(RuleViolation::NonFiniteAmount { field: "sdg_funding" })
        );
    }
}
