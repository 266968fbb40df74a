use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::TargetType;

/// Baseline, quarterly and annual targets plus the reporting period selection.
///
/// Shared by performance measures and main activities.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Targets {
    /// Free text; numeric baselines take part in the increasing/decreasing rules.
    pub baseline: Option<String>,
    pub target_type: TargetType,
    pub q1_target: f64,
    pub q2_target: f64,
    pub q3_target: f64,
    pub q4_target: f64,
    pub annual_target: f64,
    #[serde(default)]
    pub selected_months: Vec<String>,
    #[serde(default)]
    pub selected_quarters: Vec<String>,
}

impl Targets {
    #[must_use]
    pub fn quarters(&self) -> [f64; 4] {
        [self.q1_target, self.q2_target, self.q3_target, self.q4_target]
    }

    #[must_use]
    pub fn quarterly_sum(&self) -> f64 {
        self.quarters().iter().sum()
    }

    /// The baseline as a number, or `None` when absent or not numeric.
    #[must_use]
    pub fn numeric_baseline(&self) -> Option<f64> {
        self.baseline
            .as_deref()
            .and_then(|b| b.trim().parse::<f64>().ok())
    }
}
