//! Hierarchical weight budgets.
//!
//! ```text
//! objective (effective weight)
//!   └─ initiative.weight ≤ objective effective weight
//!        ├─ Σ activity weights ≤ 65% of initiative weight
//!        └─ Σ measure weights  ≤ 35% of initiative weight
//! ```
//!
//! Sibling sets passed to [`check_allocation`] must already be filtered with
//! [`crate::rules::visibility`] for the scope the record renders under and
//! must exclude the record being updated. [`check_scoped_allocation`] does
//! that filtering itself for every scope a record renders under.

use std::collections::BTreeSet;

use crate::rules::visibility::{Scope, Scoped, visible_weight_total};
use crate::validation::RuleViolation;

/// Slack allowed when comparing weight sums against a ceiling.
pub const TOLERANCE: f64 = 0.01;

/// Anything contributing a weight to its parent's budget.
pub trait Weighted {
    fn weight(&self) -> f64;
}

/// Which share of an initiative's weight a child kind draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Activity,
    Measure,
}

impl ChildKind {
    /// Percentage of the initiative weight available to this kind.
    #[must_use]
    pub const fn percent(self) -> u32 {
        match self {
            Self::Activity => 65,
            Self::Measure => 35,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Activity => "activities",
            Self::Measure => "performance measures",
        }
    }

    /// Weight ceiling for this kind under an initiative of `initiative_weight`.
    #[must_use]
    pub fn ceiling(self, initiative_weight: f64) -> f64 {
        initiative_weight * f64::from(self.percent()) / 100.0
    }
}

/// Round to cents for reporting.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// An initiative may not outweigh its parent objective.
///
/// # Errors
///
/// Returns `RuleViolation::WeightExceedsParent` when `candidate` is above
/// `parent_effective_weight`.
pub fn check_initiative_weight(
    candidate: f64,
    parent_effective_weight: f64,
) -> Result<(), RuleViolation> {
    if candidate > parent_effective_weight {
        return Err(RuleViolation::WeightExceedsParent {
            weight: candidate,
            ceiling: parent_effective_weight,
        });
    }
    Ok(())
}

/// Budget still available to `kind` under an initiative, never negative.
#[must_use]
pub fn remaining_allocation(kind: ChildKind, initiative_weight: f64, siblings_total: f64) -> f64 {
    round2((kind.ceiling(initiative_weight) - siblings_total).max(0.0))
}

/// Adding `candidate` to the siblings must keep the kind within its share.
///
/// # Errors
///
/// Returns `RuleViolation::WeightExceedsAllocation` naming the remaining budget.
pub fn check_allocation<I>(
    kind: ChildKind,
    initiative_weight: f64,
    sibling_weights: I,
    candidate: f64,
) -> Result<(), RuleViolation>
where
    I: IntoIterator<Item = f64>,
{
    let siblings_total: f64 = sibling_weights.into_iter().sum();
    let ceiling = kind.ceiling(initiative_weight);
    let total = siblings_total + candidate;
    if total > ceiling + TOLERANCE {
        return Err(RuleViolation::WeightExceedsAllocation {
            kind: kind.label(),
            total: round2(total),
            ceiling: round2(ceiling),
            percent: kind.percent(),
            remaining: remaining_allocation(kind, initiative_weight, siblings_total),
        });
    }
    Ok(())
}

/// Every view a set of children renders under: the organization-free view
/// plus one per owning organization.
pub fn render_scopes<'a, T, I>(children: I) -> Vec<Option<String>>
where
    T: Scoped + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let owners: BTreeSet<String> = children
        .into_iter()
        .filter_map(|child| child.scope().organization().map(String::from))
        .collect();
    std::iter::once(None).chain(owners.into_iter().map(Some)).collect()
}

/// The allocation rule in every scope `candidate` is visible in.
///
/// An owned candidate only renders under its own organization. A global
/// candidate renders under every scope, so the heaviest one decides. With no
/// candidate, the existing children are re-checked against the ceiling in all
/// scopes, as when the initiative's own weight changes.
///
/// # Errors
///
/// Returns `RuleViolation::WeightExceedsAllocation` for the heaviest scope.
pub fn check_scoped_allocation<T>(
    kind: ChildKind,
    initiative_weight: f64,
    siblings: &[T],
    candidate: Option<(&Scope, f64)>,
) -> Result<(), RuleViolation>
where
    T: Scoped + Weighted,
{
    let (scopes, weight) = match candidate {
        Some((Scope::OwnedBy(org), weight)) => (vec![Some(org.clone())], weight),
        Some((Scope::Global, weight)) => (render_scopes(siblings), weight),
        None => (render_scopes(siblings), 0.0),
    };
    let heaviest = scopes
        .iter()
        .map(|scope| visible_weight_total(siblings, scope.as_deref()))
        .fold(0.0, f64::max);
    check_allocation(kind, initiative_weight, [heaviest], weight)
}

/// Weights are percentages.
///
/// # Errors
///
/// Returns `RuleViolation::WeightOutOfRange` outside `0..=100`.
pub fn check_weight_range(field: &'static str, value: f64) -> Result<(), RuleViolation> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(RuleViolation::WeightOutOfRange { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::below(20.0, 30.0, true)]
    #[case::equal(30.0, 30.0, true)]
    #[case::above(30.5, 30.0, false)]
    fn initiative_against_objective(#[case] weight: f64, #[case] parent: f64, #[case] ok: bool) {
        assert_eq!(check_initiative_weight(weight, parent).is_ok(), ok);
    }

    #[rstest]
    #[case::activities_fit(ChildKind::Activity, vec![30.0, 20.0], 15.0, true)]
    #[case::activities_within_tolerance(ChildKind::Activity, vec![30.0, 20.0], 15.005, true)]
    #[case::activities_over(ChildKind::Activity, vec![30.0, 20.0], 15.5, false)]
    #[case::measures_fit(ChildKind::Measure, vec![20.0], 15.0, true)]
    #[case::measures_over(ChildKind::Measure, vec![20.0], 16.0, false)]
    #[case::empty_siblings(ChildKind::Measure, vec![], 35.0, true)]
    fn allocation_under_initiative_of_100(
        #[case] kind: ChildKind,
        #[case] siblings: Vec<f64>,
        #[case] candidate: f64,
        #[case] ok: bool,
    ) {
        assert_eq!(check_allocation(kind, 100.0, siblings, candidate).is_ok(), ok);
    }

    #[test]
    fn allocation_failure_reports_remaining_budget() {
        let err = check_allocation(ChildKind::Activity, 100.0, [50.0], 20.0).unwrap_err();
        match err {
            RuleViolation::WeightExceedsAllocation {
                remaining,
                ceiling,
                total,
                percent,
                ..
            } => {
                assert!((remaining - 15.0).abs() < f64::EPSILON);
                assert!((ceiling - 65.0).abs() < f64::EPSILON);
                assert!((total - 70.0).abs() < f64::EPSILON);
                assert_eq!(percent, 65);
            }
            other => panic!("expected WeightExceedsAllocation, got {other:?}"),
        }
    }

    #[test]
    fn measure_failure_message_names_remaining() {
        let err = check_allocation(ChildKind::Measure, 40.0, [10.0], 5.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Total performance measures weight (15) cannot exceed 14 (35% of initiative weight). \
             Remaining weight: 4"
        );
    }

    #[test]
    fn remaining_never_negative() {
        assert!(remaining_allocation(ChildKind::Measure, 10.0, 20.0).abs() < f64::EPSILON);
    }

    struct Child {
        org: Option<&'static str>,
        weight: f64,
    }

    impl Scoped for Child {
        fn scope(&self) -> Scope {
            Scope::from_organization(self.org)
        }
    }

    impl Weighted for Child {
        fn weight(&self) -> f64 {
            self.weight
        }
    }

    fn children() -> Vec<Child> {
        vec![
            Child { org: None, weight: 2.0 },
            Child { org: Some("org-a"), weight: 11.0 },
            Child { org: Some("org-b"), weight: 4.0 },
        ]
    }

    #[test]
    fn scopes_cover_global_and_each_owner() {
        assert_eq!(
            render_scopes(&children()),
            vec![None, Some("org-a".to_string()), Some("org-b".to_string())]
        );
        assert_eq!(render_scopes::<Child, _>(&[]), vec![None]);
    }

    #[rstest]
    // org-a shows 13 of 13 already.
    #[case::owned_by_full_org(Scope::OwnedBy("org-a".into()), 0.5, false)]
    // org-b shows 6, room for 7.
    #[case::owned_by_roomy_org(Scope::OwnedBy("org-b".into()), 7.0, true)]
    #[case::global_blocked_by_fullest_org(Scope::Global, 0.5, false)]
    #[case::global_zero(Scope::Global, 0.0, true)]
    fn scoped_allocation_under_initiative_of_20(
        #[case] scope: Scope,
        #[case] candidate: f64,
        #[case] ok: bool,
    ) {
        let result =
            check_scoped_allocation(ChildKind::Activity, 20.0, &children(), Some((&scope, candidate)));
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn lowered_initiative_weight_rechecks_every_scope() {
        assert!(check_scoped_allocation(ChildKind::Activity, 20.0, &children(), None).is_ok());
        let err = check_scoped_allocation(ChildKind::Activity, 10.0, &children(), None).unwrap_err();
        assert_eq!(
            err,
            RuleViolation::WeightExceedsAllocation {
                kind: "activities",
                total: 13.0,
                ceiling: 6.5,
                percent: 65,
                remaining: 0.0,
            }
        );
    }

    #[test]
    fn weight_range() {
        assert!(check_weight_range("weight", 0.0).is_ok());
        assert!(check_weight_range("weight", 100.0).is_ok());
        assert_eq!(
            check_weight_range("planner_weight", 100.5),
            Err(RuleViolation::WeightOutOfRange { field: "planner_weight" })
        );
    }
}
