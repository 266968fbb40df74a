//! Coded enums for targets, budgets, plans, roles, and cost reference tables.
//!
//! Serialization follows the codes stored in the database: target shapes are
//! lowercase (`"cumulative"`), every other code is `SCREAMING_SNAKE_CASE`
//! (`"WITH_TOOL"`, `"SUBMITTED"`). `PlanStatus` carries the review state machine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TargetType
// ---------------------------------------------------------------------------

/// Shape governing how quarterly targets relate to the annual target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Quarters add up to the annual target.
    Cumulative,
    /// Quarters never decrease; the last quarter is the annual target.
    Increasing,
    /// Quarters never increase; the last quarter is the annual target.
    Decreasing,
    /// Every quarter equals the annual target.
    Constant,
}

impl TargetType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cumulative => "cumulative",
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Constant => "constant",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BudgetCalculationType
// ---------------------------------------------------------------------------

/// Which of the two estimated-cost fields is authoritative for a budget line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetCalculationType {
    WithTool,
    WithoutTool,
}

impl BudgetCalculationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WithTool => "WITH_TOOL",
            Self::WithoutTool => "WITHOUT_TOOL",
        }
    }
}

impl fmt::Display for BudgetCalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActivityType
// ---------------------------------------------------------------------------

/// Costing tool used for a sub-activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    Training,
    Meeting,
    Workshop,
    Printing,
    Procurement,
    Supervision,
    Other,
}

impl ActivityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Training => "TRAINING",
            Self::Meeting => "MEETING",
            Self::Workshop => "WORKSHOP",
            Self::Printing => "PRINTING",
            Self::Procurement => "PROCUREMENT",
            Self::Supervision => "SUPERVISION",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PlanStatus
// ---------------------------------------------------------------------------

/// Status of a plan through its review lifecycle.
///
/// ```text
/// DRAFT → SUBMITTED → APPROVED
///                   → REJECTED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl PlanStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Submitted],
            Self::Submitted => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReviewStatus
// ---------------------------------------------------------------------------

/// Verdict recorded by an evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Approved,
    Rejected,
}

impl ReviewStatus {
    /// The plan status a review with this verdict moves its plan to.
    #[must_use]
    pub const fn plan_status(self) -> PlanStatus {
        match self {
            Self::Approved => PlanStatus::Approved,
            Self::Rejected => PlanStatus::Rejected,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OrgRole
// ---------------------------------------------------------------------------

/// Role a user holds inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgRole {
    Admin,
    Planner,
    Evaluator,
    User,
}

impl OrgRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Planner => "PLANNER",
            Self::Evaluator => "EVALUATOR",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Cost reference codes
// ---------------------------------------------------------------------------

/// Declares a coded enum with its stored code and a human-readable label.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($code:literal, $label:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            /// Label shown next to the code in outbound views.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

coded_enum! {
    /// Land transport fare basis.
    TripType {
        SingleTrip => ("SINGLE_TRIP", "Single Trip"),
        RoundTrip => ("ROUND_TRIP", "Round Trip"),
    }
}

coded_enum! {
    /// Service priced by an accommodation entry.
    AccommodationService {
        Lunch => ("LUNCH", "Lunch"),
        HallRefreshment => ("HALL_REFRESHMENT", "Hall with Refreshment"),
        Dinner => ("DINNER", "Dinner"),
        Bed => ("BED", "Bed"),
        FullBoard => ("FULL_BOARD", "Full Board"),
    }
}

coded_enum! {
    /// Per-participant consumable.
    ParticipantCostType {
        FlashDisk => ("FLASH_DISK", "Flash Disk"),
        Stationary => ("STATIONARY", "Stationary"),
        All => ("ALL", "All"),
    }
}

coded_enum! {
    /// Per-session consumable.
    SessionCostType {
        FlipChart => ("FLIP_CHART", "Flip Chart"),
        Marker => ("MARKER", "Marker"),
        ToiletPaper => ("TOILET_PAPER", "Toilet Paper"),
        All => ("ALL", "All"),
    }
}

coded_enum! {
    /// Printed document kind.
    PrintingDocumentType {
        Manual => ("MANUAL", "Manual"),
        Booklet => ("BOOKLET", "Booklet"),
        Leaflet => ("LEAFLET", "Leaflet"),
        Brochure => ("BROCHURE", "Brochure"),
    }
}

coded_enum! {
    /// Supervision allowance kind.
    SupervisorCostType {
        MobileCard => ("MOBILE_CARD", "Mobile Card"),
        Stationary => ("STATIONARY", "Stationary"),
        AllExceptMobileCard => ("ALL_EXCEPT_MOBILE_CARD", "All Except Mobile Card"),
    }
}

coded_enum! {
    /// Procurement catalogue category.
    ProcurementCategory {
        Stationery => ("STATIONERY", "Stationery"),
        Furniture => ("FURNITURE", "Furniture"),
        ItEquipment => ("IT_EQUIPMENT", "IT Equipment"),
        Medical => ("MEDICAL", "Medical Supplies"),
        Other => ("OTHER", "Other"),
    }
}

coded_enum! {
    /// Unit a procurement item is priced in.
    ProcurementUnit {
        Piece => ("PIECE", "Piece"),
        Pack => ("PACK", "Pack"),
        Box => ("BOX", "Box"),
        Ream => ("REAM", "Ream"),
        Set => ("SET", "Set"),
        Liter => ("LITER", "Liter"),
        Kilogram => ("KILOGRAM", "Kilogram"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
                assert_eq!(val.as_str(), $expected_str);
            }
        };
    }

    test_serde_roundtrip!(target_cumulative, TargetType, TargetType::Cumulative, "cumulative");
    test_serde_roundtrip!(target_decreasing, TargetType, TargetType::Decreasing, "decreasing");
    test_serde_roundtrip!(
        calc_with_tool,
        BudgetCalculationType,
        BudgetCalculationType::WithTool,
        "WITH_TOOL"
    );
    test_serde_roundtrip!(
        calc_without_tool,
        BudgetCalculationType,
        BudgetCalculationType::WithoutTool,
        "WITHOUT_TOOL"
    );
    test_serde_roundtrip!(plan_submitted, PlanStatus, PlanStatus::Submitted, "SUBMITTED");
    test_serde_roundtrip!(review_rejected, ReviewStatus, ReviewStatus::Rejected, "REJECTED");
    test_serde_roundtrip!(role_evaluator, OrgRole, OrgRole::Evaluator, "EVALUATOR");
    test_serde_roundtrip!(
        accommodation_hall,
        AccommodationService,
        AccommodationService::HallRefreshment,
        "HALL_REFRESHMENT"
    );
    test_serde_roundtrip!(
        supervisor_all_except,
        SupervisorCostType,
        SupervisorCostType::AllExceptMobileCard,
        "ALL_EXCEPT_MOBILE_CARD"
    );

    #[test]
    fn plan_status_transitions() {
        assert!(PlanStatus::Draft.can_transition_to(PlanStatus::Submitted));
        assert!(PlanStatus::Submitted.can_transition_to(PlanStatus::Approved));
        assert!(PlanStatus::Submitted.can_transition_to(PlanStatus::Rejected));
        assert!(!PlanStatus::Draft.can_transition_to(PlanStatus::Approved));
        assert!(PlanStatus::Approved.allowed_next_states().is_empty());
        assert!(PlanStatus::Rejected.allowed_next_states().is_empty());
    }

    #[test]
    fn review_status_maps_to_plan_status() {
        assert_eq!(ReviewStatus::Approved.plan_status(), PlanStatus::Approved);
        assert_eq!(ReviewStatus::Rejected.plan_status(), PlanStatus::Rejected);
    }

    #[test]
    fn cost_codes_have_labels() {
        assert_eq!(TripType::RoundTrip.label(), "Round Trip");
        assert_eq!(ProcurementUnit::Ream.label(), "Ream");
        assert_eq!(ProcurementCategory::ItEquipment.to_string(), "IT_EQUIPMENT");
    }
}
